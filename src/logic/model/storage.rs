//! Model Storage
//!
//! A saved model is a directory holding `model.json` (network, scaler,
//! encoder, feature layout, training summary) and `model.sha256`, the hex
//! SHA-256 of `model.json`. Loading verifies both before anything is used.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{CHECKSUM_FILE_NAME, MODEL_FILE_NAME, MODEL_FORMAT_VERSION};
use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::LayoutInfo;
use crate::logic::preprocess::{LabelEncoder, StandardScaler};
use super::network::Sequential;
use super::training::History;

/// Outcome of the training run stored next to the weights
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub batch_size: usize,
    pub train_rows: usize,
    pub final_loss: Option<f32>,
    pub final_accuracy: Option<f32>,
    pub final_val_accuracy: Option<f32>,
    pub test_loss: f32,
    pub test_accuracy: f32,
}

impl TrainingSummary {
    pub fn from_history(history: &History, batch_size: usize, train_rows: usize, test_loss: f32, test_accuracy: f32) -> Self {
        let last = history.last();
        Self {
            epochs: history.len(),
            batch_size,
            train_rows,
            final_loss: last.map(|m| m.loss),
            final_accuracy: last.map(|m| m.accuracy),
            final_val_accuracy: last.and_then(|m| m.val_accuracy),
            test_loss,
            test_accuracy,
        }
    }
}

/// Everything needed to reproduce predictions on raw samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    pub format_version: u32,
    pub layout: LayoutInfo,
    pub scaler: StandardScaler,
    pub encoder: LabelEncoder,
    pub network: Sequential,
    pub training: Option<TrainingSummary>,
    pub saved_at: DateTime<Utc>,
}

impl SavedModel {
    pub fn new(scaler: StandardScaler, encoder: LabelEncoder, network: Sequential) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            layout: LayoutInfo::current(),
            scaler,
            encoder,
            network,
            training: None,
            saved_at: Utc::now(),
        }
    }

    pub fn with_training(mut self, summary: TrainingSummary) -> Self {
        self.training = Some(summary);
        self
    }

    /// Format, layout and shape checks shared by save and load
    pub fn validate(&self) -> PipelineResult<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(PipelineError::UnsupportedFormat(self.format_version));
        }
        self.layout.validate()?;
        self.network.validate()?;

        if !self.scaler.is_fitted() {
            return Err(PipelineError::NotFitted("StandardScaler"));
        }
        if self.encoder.num_classes() != self.network.output_dim() {
            return Err(PipelineError::invalid(format!(
                "encoder has {} classes, network outputs {}",
                self.encoder.num_classes(),
                self.network.output_dim()
            )));
        }
        Ok(())
    }
}

/// Hex SHA-256 of a byte slice
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Write the model directory, returns the model file path
pub fn save_model(model: &SavedModel, dir: &Path) -> PipelineResult<PathBuf> {
    model.validate()?;
    fs::create_dir_all(dir)?;

    let json = serde_json::to_vec_pretty(model)?;
    let checksum = compute_checksum(&json);

    let model_path = dir.join(MODEL_FILE_NAME);
    fs::write(&model_path, &json)?;
    fs::write(dir.join(CHECKSUM_FILE_NAME), format!("{}\n", checksum))?;

    log::info!(
        "Saved model to {} ({} bytes, sha256 {}...)",
        model_path.display(),
        json.len(),
        &checksum[..12]
    );
    Ok(model_path)
}

/// Read, verify and validate a model directory
pub fn load_model(dir: &Path) -> PipelineResult<SavedModel> {
    let model_path = dir.join(MODEL_FILE_NAME);
    let data = fs::read(&model_path)?;

    let expected = fs::read_to_string(dir.join(CHECKSUM_FILE_NAME))?.trim().to_string();
    let actual = compute_checksum(&data);
    if !expected.eq_ignore_ascii_case(&actual) {
        return Err(PipelineError::ChecksumMismatch { expected, actual });
    }

    let model: SavedModel = serde_json::from_slice(&data)?;
    model.validate()?;

    log::info!("Loaded model from {} (saved {})", model_path.display(), model.saved_at.to_rfc3339());
    Ok(model)
}
