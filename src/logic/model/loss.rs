//! Categorical cross-entropy and accuracy

use ndarray::{Array2, ArrayView1, Zip};

/// Probabilities are clipped into [EPSILON, 1 - EPSILON] before the log
pub const EPSILON: f32 = 1e-7;

/// Mean over rows of `-sum(y * ln(p))`
pub fn categorical_crossentropy(probs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    let n = probs.nrows();
    if n == 0 {
        return 0.0;
    }

    let mut total = 0.0f32;
    Zip::from(probs).and(targets).for_each(|&p, &y| {
        if y != 0.0 {
            total -= y * p.clamp(EPSILON, 1.0 - EPSILON).ln();
        }
    });
    total / n as f32
}

/// dL/dz for softmax output + cross-entropy, averaged over the batch
pub fn softmax_crossentropy_grad(probs: &Array2<f32>, targets: &Array2<f32>) -> Array2<f32> {
    let n = probs.nrows().max(1) as f32;
    (probs - targets) / n
}

/// Index of the largest entry (first on ties)
pub fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

pub fn argmax_rows(m: &Array2<f32>) -> Vec<usize> {
    m.rows().into_iter().map(argmax).collect()
}

/// Number of rows whose arg-max prediction matches the arg-max target
pub fn correct_count(probs: &Array2<f32>, targets: &Array2<f32>) -> usize {
    probs
        .rows()
        .into_iter()
        .zip(targets.rows())
        .filter(|(p, y)| argmax(p.view()) == argmax(y.view()))
        .count()
}

pub fn accuracy(probs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    if probs.nrows() == 0 {
        return 0.0;
    }
    correct_count(probs, targets) as f32 / probs.nrows() as f32
}
