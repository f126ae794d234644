//! Sample - one simulated user's phone-usage metrics

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::layout::FEATURE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Hours of screen time per day
    pub screen_time_hours: f64,
    /// Phone unlocks per day
    pub daily_unlocks: u32,
    /// Hours of social media per day
    pub social_media_hours: f64,
}

impl Sample {
    pub fn new(screen_time_hours: f64, daily_unlocks: u32, social_media_hours: f64) -> Self {
        Self {
            screen_time_hours,
            daily_unlocks,
            social_media_hours,
        }
    }

    /// Values in `FEATURE_LAYOUT` order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.screen_time_hours,
            self.daily_unlocks as f64,
            self.social_media_hours,
        ]
    }
}

/// N×3 feature matrix in layout order
pub fn feature_matrix(samples: &[Sample]) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((samples.len(), FEATURE_COUNT));
    for (mut row, sample) in matrix.rows_mut().into_iter().zip(samples) {
        for (cell, value) in row.iter_mut().zip(sample.to_array()) {
            *cell = value;
        }
    }
    matrix
}
