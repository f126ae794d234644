//! Synthetic Data Generator
//!
//! Columns are drawn one at a time from a single seeded RNG: every screen
//! time first, then every unlock count, then every social media value.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::logic::features::Sample;
use super::record::Dataset;

/// Screen time range, hours per day (upper bound exclusive)
pub const SCREEN_TIME_RANGE: std::ops::Range<f64> = 1.0..12.0;

/// Unlock count range, times per day (upper bound exclusive)
pub const UNLOCKS_RANGE: std::ops::Range<u32> = 20..300;

/// Social media range, hours per day (upper bound exclusive)
pub const SOCIAL_MEDIA_RANGE: std::ops::Range<f64> = 0.0..8.0;

/// Generate `n` labelled samples from `seed`
pub fn generate(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let screen_time: Vec<f64> = (0..n).map(|_| rng.gen_range(SCREEN_TIME_RANGE)).collect();
    let unlocks: Vec<u32> = (0..n).map(|_| rng.gen_range(UNLOCKS_RANGE)).collect();
    let social_media: Vec<f64> = (0..n).map(|_| rng.gen_range(SOCIAL_MEDIA_RANGE)).collect();

    let samples = screen_time
        .into_iter()
        .zip(unlocks)
        .zip(social_media)
        .map(|((st, ul), sm)| Sample::new(st, ul, sm))
        .collect();

    Dataset::from_samples(samples)
}
