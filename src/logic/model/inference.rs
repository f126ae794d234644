//! Inference - risk prediction on raw samples
//!
//! `RiskPredictor` wraps a trained network with its scaler and encoder.
//! `RulePredictor` applies the labelling rule directly and is the reference
//! a reloaded model is checked against.

use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::dataset::RiskLabel;
use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::sample::feature_matrix;
use crate::logic::features::Sample;
use crate::logic::preprocess::{LabelEncoder, StandardScaler};
use super::loss::argmax_rows;
use super::network::Sequential;
use super::storage::{load_model, SavedModel};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: RiskLabel,
    /// Probability of `label`
    pub confidence: f32,
    /// Probability per class, in encoder order
    pub probabilities: Vec<(RiskLabel, f32)>,
    /// "network" or "rule"
    pub method: String,
}

// ============================================================================
// ENGINE TRAIT
// ============================================================================

pub trait InferenceEngine {
    fn predict_batch(&self, samples: &[Sample]) -> PipelineResult<Vec<Prediction>>;

    fn predict(&self, sample: &Sample) -> PipelineResult<Prediction> {
        self.predict_batch(std::slice::from_ref(sample))?
            .pop()
            .ok_or(PipelineError::EmptyDataset)
    }
}

// ============================================================================
// NETWORK PREDICTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct RiskPredictor {
    scaler: StandardScaler,
    encoder: LabelEncoder,
    network: Sequential,
}

impl RiskPredictor {
    pub fn new(scaler: StandardScaler, encoder: LabelEncoder, network: Sequential) -> Self {
        Self { scaler, encoder, network }
    }

    pub fn from_saved(model: SavedModel) -> Self {
        Self::new(model.scaler, model.encoder, model.network)
    }

    /// Load a model directory written by `save_model`
    pub fn load(dir: &Path) -> PipelineResult<Self> {
        Ok(Self::from_saved(load_model(dir)?))
    }

    fn features(&self, samples: &[Sample]) -> PipelineResult<Array2<f32>> {
        let raw = feature_matrix(samples);
        Ok(self.scaler.transform(&raw)?.mapv(|v| v as f32))
    }
}

impl InferenceEngine for RiskPredictor {
    fn predict_batch(&self, samples: &[Sample]) -> PipelineResult<Vec<Prediction>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let probs = self.network.predict(&self.features(samples)?)?;
        let codes = argmax_rows(&probs);
        let labels = self.encoder.inverse_transform(&codes)?;

        Ok(probs
            .rows()
            .into_iter()
            .zip(codes)
            .zip(labels)
            .map(|((row, code), label)| Prediction {
                label,
                confidence: row[code],
                probabilities: self
                    .encoder
                    .classes()
                    .iter()
                    .copied()
                    .zip(row.iter().copied())
                    .collect(),
                method: "network".to_string(),
            })
            .collect())
    }
}

// ============================================================================
// RULE FALLBACK
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct RulePredictor;

impl InferenceEngine for RulePredictor {
    fn predict_batch(&self, samples: &[Sample]) -> PipelineResult<Vec<Prediction>> {
        Ok(samples
            .iter()
            .map(|s| {
                let label = RiskLabel::classify(s);
                Prediction {
                    label,
                    confidence: 1.0,
                    probabilities: RiskLabel::ALL
                        .iter()
                        .map(|&l| (l, if l == label { 1.0 } else { 0.0 }))
                        .collect(),
                    method: "rule".to_string(),
                }
            })
            .collect())
    }
}
