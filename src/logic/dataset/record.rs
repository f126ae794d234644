//! Dataset - labelled samples and their summary statistics

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::features::sample::feature_matrix;
use crate::logic::features::Sample;
use super::label::RiskLabel;

/// Samples with their labels, index-aligned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub samples: Vec<Sample>,
    pub labels: Vec<RiskLabel>,
}

impl Dataset {
    /// Label every sample with the threshold rule
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let labels = samples.iter().map(RiskLabel::classify).collect();
        Self { samples, labels }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// N×3 feature matrix in layout order
    pub fn features(&self) -> Array2<f64> {
        feature_matrix(&self.samples)
    }

    /// Rows at the given indices, in index order
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            samples: indices.iter().map(|&i| self.samples[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Count per label (labels with zero samples included)
    pub fn class_distribution(&self) -> BTreeMap<RiskLabel, usize> {
        let mut counts: BTreeMap<RiskLabel, usize> =
            RiskLabel::ALL.iter().map(|&l| (l, 0)).collect();
        for label in &self.labels {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }

    /// Most frequent label and the accuracy of always predicting it
    pub fn majority_baseline(&self) -> Option<(RiskLabel, f64)> {
        if self.is_empty() {
            return None;
        }
        self.class_distribution()
            .into_iter()
            .max_by_key(|&(_, count)| count)
            .map(|(label, count)| (label, count as f64 / self.len() as f64))
    }
}
