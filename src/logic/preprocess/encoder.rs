//! Label Encoder & One-hot
//!
//! Classes are ordered by their string form, so the default
//! encoding is High = 0, Low = 1, Medium = 2.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::dataset::RiskLabel;
use crate::logic::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<RiskLabel>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder over every known risk label
    pub fn for_all_labels() -> Self {
        let mut encoder = Self::new();
        encoder.fit(&RiskLabel::ALL);
        encoder
    }

    /// Learn the sorted set of classes present in `labels`
    pub fn fit(&mut self, labels: &[RiskLabel]) -> &mut Self {
        let mut classes: Vec<RiskLabel> = labels.to_vec();
        classes.sort_by_key(|l| l.as_str());
        classes.dedup();
        self.classes = classes;
        self
    }

    pub fn classes(&self) -> &[RiskLabel] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn encode(&self, label: RiskLabel) -> PipelineResult<usize> {
        if self.classes.is_empty() {
            return Err(PipelineError::NotFitted("LabelEncoder"));
        }
        self.classes
            .iter()
            .position(|&c| c == label)
            .ok_or_else(|| PipelineError::UnknownClass(label.to_string()))
    }

    pub fn transform(&self, labels: &[RiskLabel]) -> PipelineResult<Vec<usize>> {
        labels.iter().map(|&l| self.encode(l)).collect()
    }

    pub fn decode(&self, code: usize) -> PipelineResult<RiskLabel> {
        self.classes
            .get(code)
            .copied()
            .ok_or_else(|| PipelineError::UnknownClass(format!("code {}", code)))
    }

    pub fn inverse_transform(&self, codes: &[usize]) -> PipelineResult<Vec<RiskLabel>> {
        codes.iter().map(|&c| self.decode(c)).collect()
    }
}

/// Integer codes → N×K one-hot matrix
pub fn to_categorical(codes: &[usize], num_classes: usize) -> PipelineResult<Array2<f32>> {
    let mut onehot = Array2::<f32>::zeros((codes.len(), num_classes));
    for (row, &code) in codes.iter().enumerate() {
        if code >= num_classes {
            return Err(PipelineError::invalid(format!(
                "class code {} out of range for {} classes",
                code, num_classes
            )));
        }
        onehot[[row, code]] = 1.0;
    }
    Ok(onehot)
}
