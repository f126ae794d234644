//! Sequential Network
//!
//! A stack of layers run in order. Training forwards cache activations
//! for `backward`; `predict` is side-effect free.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};
use super::layers::{Activation, Dense, DenseGrads, Dropout, Layer};
use super::optimizer::Adam;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    pub fn new(layers: Vec<Layer>) -> PipelineResult<Self> {
        let network = Self { layers };
        network.validate()?;
        Ok(network)
    }

    /// `input → [Dense(h, relu) → Dropout]* → Dense(classes, softmax)`
    pub fn classifier(
        input_dim: usize,
        hidden: &[usize],
        num_classes: usize,
        dropout_rate: f32,
        seed: u64,
    ) -> PipelineResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(hidden.len() * 2 + 1);
        let mut width = input_dim;

        for &units in hidden {
            layers.push(Layer::Dense(Dense::new(width, units, Activation::Relu, &mut rng)));
            layers.push(Layer::Dropout(Dropout::new(dropout_rate)));
            width = units;
        }
        layers.push(Layer::Dense(Dense::new(width, num_classes, Activation::Softmax, &mut rng)));

        Self::new(layers)
    }

    /// Shapes must chain and the output must be a softmax dense layer
    pub fn validate(&self) -> PipelineResult<()> {
        let mut width: Option<usize> = None;

        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Dense(dense) => {
                    if dense.weights.ncols() != dense.bias.len() {
                        return Err(PipelineError::invalid(format!(
                            "layer {}: bias has {} entries for {} units",
                            i,
                            dense.bias.len(),
                            dense.weights.ncols()
                        )));
                    }
                    if let Some(w) = width {
                        if dense.input_dim() != w {
                            return Err(PipelineError::invalid(format!(
                                "layer {}: expects {} inputs, previous layer gives {}",
                                i,
                                dense.input_dim(),
                                w
                            )));
                        }
                    }
                    width = Some(dense.output_dim());
                }
                Layer::Dropout(dropout) => {
                    if !(0.0..1.0).contains(&dropout.rate) {
                        return Err(PipelineError::invalid(format!(
                            "layer {}: dropout rate {} out of [0, 1)",
                            i, dropout.rate
                        )));
                    }
                }
            }
        }

        match self.layers.last() {
            Some(Layer::Dense(d)) if d.activation == Activation::Softmax => Ok(()),
            Some(_) => Err(PipelineError::invalid("last layer must be a softmax dense layer")),
            None => Err(PipelineError::invalid("network has no layers")),
        }
    }

    pub fn input_dim(&self) -> usize {
        self.dense_layers().next().map(Dense::input_dim).unwrap_or(0)
    }

    pub fn output_dim(&self) -> usize {
        self.dense_layers().last().map(Dense::output_dim).unwrap_or(0)
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Layer::param_count).sum()
    }

    fn dense_layers(&self) -> impl Iterator<Item = &Dense> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Dense(d) => Some(d),
            Layer::Dropout(_) => None,
        })
    }

    fn check_input(&self, x: &Array2<f32>) -> PipelineResult<()> {
        if x.ncols() != self.input_dim() {
            return Err(PipelineError::invalid(format!(
                "network expects {} features, got {}",
                self.input_dim(),
                x.ncols()
            )));
        }
        Ok(())
    }

    /// Inference forward: dropout off, nothing cached
    pub fn predict(&self, x: &Array2<f32>) -> PipelineResult<Array2<f32>> {
        self.check_input(x)?;
        let mut out = x.clone();
        for layer in &self.layers {
            if let Layer::Dense(dense) = layer {
                out = dense.infer(&out);
            }
        }
        Ok(out)
    }

    /// Training forward: dropout active, activations cached
    pub fn forward(&mut self, x: &Array2<f32>, rng: &mut StdRng) -> PipelineResult<Array2<f32>> {
        self.check_input(x)?;
        let mut out = x.clone();
        for layer in &mut self.layers {
            out = match layer {
                Layer::Dense(dense) => dense.forward(&out),
                Layer::Dropout(dropout) => dropout.forward(&out, true, rng),
            };
        }
        Ok(out)
    }

    /// Backpropagate dL/dz of the output layer.
    /// Returns one entry per layer, `None` for parameter-free layers.
    pub fn backward(&mut self, grad: Array2<f32>) -> PipelineResult<Vec<Option<DenseGrads>>> {
        let mut grads = Vec::with_capacity(self.layers.len());
        let mut upstream = grad;

        for layer in self.layers.iter_mut().rev() {
            match layer {
                Layer::Dense(dense) => {
                    let (dx, g) = dense.backward(&upstream)?;
                    grads.push(Some(g));
                    upstream = dx;
                }
                Layer::Dropout(dropout) => {
                    upstream = dropout.backward(&upstream);
                    grads.push(None);
                }
            }
        }

        grads.reverse();
        Ok(grads)
    }

    /// One optimizer step with grads from `backward`
    pub fn apply_gradients(&mut self, grads: &[Option<DenseGrads>], optimizer: &mut Adam) {
        optimizer.begin_step();

        let mut slot = 0;
        for (layer, grad) in self.layers.iter_mut().zip(grads) {
            if let (Layer::Dense(dense), Some(g)) = (layer, grad) {
                optimizer.update(slot, &mut dense.weights, &g.weights);
                optimizer.update(slot + 1, &mut dense.bias, &g.bias);
                slot += 2;
            }
        }
    }

    /// Layer table for logs
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("{:<4} {:<10} {:<14} {:>8}", "#", "layer", "shape", "params")];
        for (i, layer) in self.layers.iter().enumerate() {
            let shape = match layer {
                Layer::Dense(d) => format!("{}→{} {:?}", d.input_dim(), d.output_dim(), d.activation),
                Layer::Dropout(d) => format!("rate {}", d.rate),
            };
            lines.push(format!("{:<4} {:<10} {:<14} {:>8}", i, layer.name(), shape, layer.param_count()));
        }
        lines.push(format!("total params: {}", self.param_count()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::loss::{categorical_crossentropy, softmax_crossentropy_grad};
    use ndarray::{array, Array1};

    fn small() -> Sequential {
        Sequential::classifier(3, &[8, 4], 3, 0.2, 42).unwrap()
    }

    #[test]
    fn test_classifier_shape() {
        let net = Sequential::classifier(3, &[64, 32], 3, 0.2, 42).unwrap();
        assert_eq!(net.layers.len(), 5);
        assert_eq!(net.input_dim(), 3);
        assert_eq!(net.output_dim(), 3);
        assert_eq!(net.param_count(), (3 * 64 + 64) + (64 * 32 + 32) + (32 * 3 + 3));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = serde_json::to_string(&small()).unwrap();
        let b = serde_json::to_string(&small()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_is_distribution() {
        let net = small();
        let p = net.predict(&array![[0.1, -0.5, 1.2], [2.0, 0.0, -1.0]]).unwrap();
        assert_eq!(p.dim(), (2, 3));
        for row in p.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-5);
        }
        assert!(net.predict(&array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_validate_rejects_broken_stacks() {
        let mut rng = StdRng::seed_from_u64(0);
        let mismatched = vec![
            Layer::Dense(Dense::new(3, 4, Activation::Relu, &mut rng)),
            Layer::Dense(Dense::new(5, 3, Activation::Softmax, &mut rng)),
        ];
        assert!(Sequential::new(mismatched).is_err());

        let no_softmax = vec![Layer::Dense(Dense::new(3, 3, Activation::Relu, &mut rng))];
        assert!(Sequential::new(no_softmax).is_err());

        assert!(Sequential::new(vec![]).is_err());

        let mut bad_bias = Dense::new(3, 3, Activation::Softmax, &mut rng);
        bad_bias.bias = Array1::zeros(2);
        assert!(Sequential::new(vec![Layer::Dense(bad_bias)]).is_err());
    }

    #[test]
    fn test_training_steps_reduce_loss() {
        let mut net = Sequential::classifier(2, &[16], 2, 0.0, 7).unwrap();
        let x = array![[1.0, 1.0], [1.2, 0.8], [-1.0, -1.0], [-0.8, -1.2]];
        let y = array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let mut adam = Adam::new(0.01);

        let before = categorical_crossentropy(&net.predict(&x).unwrap(), &y);
        for _ in 0..100 {
            let p = net.forward(&x, &mut rng).unwrap();
            let grads = net.backward(softmax_crossentropy_grad(&p, &y)).unwrap();
            net.apply_gradients(&grads, &mut adam);
        }
        let after = categorical_crossentropy(&net.predict(&x).unwrap(), &y);

        assert!(after < before);
        assert!(after < 0.25);
    }
}
