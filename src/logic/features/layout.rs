//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Saved models carry the version and layout hash and are rejected on mismatch.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::PipelineError;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Feature names in exact column order of the feature matrix
pub const FEATURE_LAYOUT: &[&str] = &[
    "screen_time_hours",  // 0: hours of screen time per day
    "daily_unlocks",      // 1: phone unlocks per day
    "social_media_hours", // 2: hours of social media per day
];

/// Total number of features
pub const FEATURE_COUNT: usize = 3;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information stored alongside a saved model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check compatibility with the layout compiled into this binary
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_layout(self.version, self.hash)
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Validate a (version, hash) pair against the current layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), PipelineError> {
    let expected_hash = layout_hash();
    if version != FEATURE_VERSION || hash != expected_hash {
        return Err(PipelineError::LayoutMismatch {
            expected_version: FEATURE_VERSION,
            expected_hash,
            actual_version: version,
            actual_hash: hash,
        });
    }
    Ok(())
}
