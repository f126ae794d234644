//! Seeded train/test partition

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::logic::error::{PipelineError, PipelineResult};
use super::record::Dataset;

/// Both halves of a split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// Number of test rows for `n` samples: `ceil(test_size * n)`
pub fn test_count(n: usize, test_size: f64) -> usize {
    ((test_size * n as f64).ceil() as usize).min(n)
}

/// Shuffle indices with `seed`; the first `ceil(test_size * n)` go to test
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> PipelineResult<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::invalid(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n = dataset.len();
    let n_test = test_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::invalid(format!(
            "cannot split {} samples with test_size {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    log::debug!("Split {} samples: {} train / {} test", n, train_idx.len(), test_idx.len());

    Ok(TrainTestSplit {
        train: dataset.select(train_idx),
        test: dataset.select(test_idx),
    })
}
