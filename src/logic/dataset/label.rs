//! Risk Labels & Rule Thresholds
//!
//! The rule is evaluated in fixed precedence: Low, then High, then Medium.
//! Boundary values fail both strict tests and fall through to Medium,
//! e.g. (4.0, 100, 2.0) is Medium.

use serde::{Deserialize, Serialize};

use crate::logic::error::PipelineError;
use crate::logic::features::Sample;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Low risk requires screen time strictly below this
pub const LOW_SCREEN_TIME_MAX: f64 = 4.0;

/// Low risk requires unlocks strictly below this
pub const LOW_UNLOCKS_MAX: u32 = 100;

/// Low risk requires social media strictly below this
pub const LOW_SOCIAL_MEDIA_MAX: f64 = 2.0;

/// High risk if screen time strictly above this
pub const HIGH_SCREEN_TIME_MIN: f64 = 8.0;

/// High risk if unlocks strictly above this
pub const HIGH_UNLOCKS_MIN: u32 = 200;

/// High risk if social media strictly above this
pub const HIGH_SOCIAL_MEDIA_MIN: f64 = 5.0;

// ============================================================================
// RISK LABEL
// ============================================================================

/// Addiction risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 3] = [RiskLabel::Low, RiskLabel::Medium, RiskLabel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
        }
    }

    /// Apply the threshold rule to a sample
    pub fn classify(sample: &Sample) -> RiskLabel {
        let st = sample.screen_time_hours;
        let ul = sample.daily_unlocks;
        let sm = sample.social_media_hours;

        if st < LOW_SCREEN_TIME_MAX && ul < LOW_UNLOCKS_MAX && sm < LOW_SOCIAL_MEDIA_MAX {
            RiskLabel::Low
        } else if st > HIGH_SCREEN_TIME_MIN || ul > HIGH_UNLOCKS_MIN || sm > HIGH_SOCIAL_MEDIA_MIN {
            RiskLabel::High
        } else {
            RiskLabel::Medium
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskLabel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskLabel::Low),
            "Medium" => Ok(RiskLabel::Medium),
            "High" => Ok(RiskLabel::High),
            other => Err(PipelineError::UnknownClass(other.to_string())),
        }
    }
}
