//! Standard Scaler
//!
//! Per-column z-score using statistics from the training split only.
//! Population std (ddof = 0); constant columns get std 1.0.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Array1<f64>> {
        self.std.as_ref()
    }

    /// Compute column statistics
    pub fn fit(&mut self, x: &Array2<f64>) -> PipelineResult<&mut Self> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let mean = x.mean_axis(Axis(0)).ok_or(PipelineError::EmptyDataset)?;
        let std = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(self)
    }

    /// Apply fitted statistics
    pub fn transform(&self, x: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(PipelineError::NotFitted("StandardScaler")),
        };

        if x.ncols() != mean.len() {
            return Err(PipelineError::invalid(format!(
                "scaler fitted on {} columns, got {}",
                mean.len(),
                x.ncols()
            )));
        }

        Ok((x - mean) / std)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_zero_mean_unit_std() {
        let x = array![[1.0, 20.0, 0.0], [5.0, 100.0, 4.0], [9.0, 290.0, 7.5], [3.0, 55.0, 1.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();

        let mean = z.mean_axis(Axis(0)).unwrap();
        let std = z.std_axis(Axis(0), 0.0);
        for j in 0..3 {
            assert!(mean[j].abs() < 1e-9);
            assert!((std[j] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transform_uses_training_stats() {
        let train = array![[0.0], [2.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();

        let z = scaler.transform(&array![[4.0]]).unwrap();
        assert!((z[[0, 0]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column() {
        let x = array![[3.0, 1.0], [3.0, 2.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();
        assert_eq!(z[[0, 0]], 0.0);
        assert_eq!(z[[1, 0]], 0.0);
    }

    #[test]
    fn test_errors() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(PipelineError::NotFitted(_))
        ));

        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0]]).is_err());

        let empty = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::new().fit(&empty).is_err());
    }
}
