//! Layers - Dense and Dropout
//!
//! Dense weights are (input, output) so a batch forward is `x · W + b`.

use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};

// ============================================================================
// ACTIVATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    /// Only valid on the output layer, paired with cross-entropy
    Softmax,
}

impl Activation {
    pub fn apply(&self, z: Array2<f32>) -> Array2<f32> {
        match self {
            Activation::Linear => z,
            Activation::Relu => z.mapv_into(|v| v.max(0.0)),
            Activation::Softmax => softmax_rows(z),
        }
    }

    /// Gradient w.r.t. the pre-activation, given the layer output.
    /// Softmax passes through: the loss already returns dL/dz.
    pub fn backward(&self, output: &Array2<f32>, grad: &Array2<f32>) -> Array2<f32> {
        match self {
            Activation::Linear | Activation::Softmax => grad.clone(),
            Activation::Relu => {
                let mut dz = grad.clone();
                dz.zip_mut_with(output, |g, &a| {
                    if a <= 0.0 {
                        *g = 0.0;
                    }
                });
                dz
            }
        }
    }
}

/// Numerically stable row-wise softmax
pub fn softmax_rows(mut z: Array2<f32>) -> Array2<f32> {
    for mut row in z.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    z
}

// ============================================================================
// DENSE
// ============================================================================

/// Gradients of one dense layer
#[derive(Debug, Clone)]
pub struct DenseGrads {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: Activation,

    // (input, output) of the last training forward
    #[serde(skip)]
    cache: Option<(Array2<f32>, Array2<f32>)>,
}

impl Dense {
    /// Glorot-uniform weights, zero bias
    pub fn new<R: Rng + ?Sized>(input: usize, output: usize, activation: Activation, rng: &mut R) -> Self {
        let limit = (6.0 / (input + output) as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        let weights = Array2::from_shape_fn((input, output), |_| dist.sample(rng));

        Self {
            weights,
            bias: Array1::zeros(output),
            activation,
            cache: None,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn param_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    /// Forward without caching
    pub fn infer(&self, x: &Array2<f32>) -> Array2<f32> {
        self.activation.apply(x.dot(&self.weights) + &self.bias)
    }

    /// Forward for training; keeps what backward needs
    pub fn forward(&mut self, x: &Array2<f32>) -> Array2<f32> {
        let out = self.infer(x);
        self.cache = Some((x.clone(), out.clone()));
        out
    }

    /// Returns (grad w.r.t. input, parameter grads)
    pub fn backward(&mut self, grad: &Array2<f32>) -> PipelineResult<(Array2<f32>, DenseGrads)> {
        let (input, output) = self
            .cache
            .take()
            .ok_or(PipelineError::NotFitted("Dense forward pass"))?;

        let dz = self.activation.backward(&output, grad);
        let grads = DenseGrads {
            weights: input.t().dot(&dz),
            bias: dz.sum_axis(Axis(0)),
        };
        let dx = dz.dot(&self.weights.t());

        Ok((dx, grads))
    }
}

// ============================================================================
// DROPOUT
// ============================================================================

/// Inverted dropout; identity outside training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropout {
    pub rate: f32,

    #[serde(skip)]
    mask: Option<Array2<f32>>,
}

impl Dropout {
    pub fn new(rate: f32) -> Self {
        Self { rate, mask: None }
    }

    pub fn forward<R: Rng + ?Sized>(&mut self, x: &Array2<f32>, training: bool, rng: &mut R) -> Array2<f32> {
        if !training || self.rate <= 0.0 {
            self.mask = None;
            return x.clone();
        }

        let keep = 1.0 - self.rate;
        let scale = 1.0 / keep;
        let mask = Array2::from_shape_fn(x.raw_dim(), |_| {
            if rng.gen::<f32>() < keep { scale } else { 0.0 }
        });

        let out = x * &mask;
        self.mask = Some(mask);
        out
    }

    pub fn backward(&mut self, grad: &Array2<f32>) -> Array2<f32> {
        match self.mask.take() {
            Some(mask) => grad * &mask,
            None => grad.clone(),
        }
    }
}

// ============================================================================
// LAYER
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Dense(_) => "dense",
            Layer::Dropout(_) => "dropout",
        }
    }

    pub fn param_count(&self) -> usize {
        match self {
            Layer::Dense(d) => d.param_count(),
            Layer::Dropout(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let p = softmax_rows(array![[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0]]);
        for row in p.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
        assert!(p[[0, 2]] > p[[0, 1]]);
        assert!((p[[1, 0]] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_relu_backward_masks() {
        let out = array![[0.0, 2.0]];
        let grad = array![[5.0, 5.0]];
        assert_eq!(Activation::Relu.backward(&out, &grad), array![[0.0, 5.0]]);
    }

    #[test]
    fn test_glorot_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let dense = Dense::new(3, 64, Activation::Relu, &mut rng);
        let limit = (6.0f32 / 67.0).sqrt();
        assert_eq!(dense.weights.dim(), (3, 64));
        assert!(dense.weights.iter().all(|w| w.abs() <= limit));
        assert!(dense.bias.iter().all(|&b| b == 0.0));
        assert_eq!(dense.param_count(), 3 * 64 + 64);
    }

    #[test]
    fn test_dense_gradients_match_finite_difference() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut dense = Dense::new(2, 2, Activation::Linear, &mut rng);
        let x = array![[0.5, -1.0], [2.0, 0.25]];

        // loss = sum(output), so dL/dout = 1
        dense.forward(&x);
        let (_, grads) = dense.backward(&Array2::ones((2, 2))).unwrap();

        let h = 1e-2;
        let base = dense.infer(&x).sum();
        dense.weights[[0, 1]] += h;
        let bumped = dense.infer(&x).sum();
        let numeric = (bumped - base) / h;
        assert!((numeric - grads.weights[[0, 1]]).abs() < 1e-2);
        assert_eq!(grads.bias, array![2.0, 2.0]);
    }

    #[test]
    fn test_backward_without_forward() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut dense = Dense::new(2, 2, Activation::Relu, &mut rng);
        assert!(dense.backward(&Array2::ones((1, 2))).is_err());
    }

    #[test]
    fn test_dropout_identity_at_inference() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut dropout = Dropout::new(0.5);
        let x = Array2::from_elem((4, 8), 1.5f32);
        assert_eq!(dropout.forward(&x, false, &mut rng), x);
    }

    #[test]
    fn test_dropout_training_scales_kept_units() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut dropout = Dropout::new(0.2);
        let x = Array2::from_elem((50, 40), 1.0f32);
        let out = dropout.forward(&x, true, &mut rng);

        assert!(out.iter().all(|&v| v == 0.0 || (v - 1.25).abs() < 1e-6));
        let dropped = out.iter().filter(|&&v| v == 0.0).count() as f32 / out.len() as f32;
        assert!(dropped > 0.1 && dropped < 0.3);

        // Backward reuses the same mask
        let grad = dropout.backward(&x);
        assert_eq!(grad, out);
    }
}
