//! Training loop
//!
//! Mini-batch Adam over a `Sequential` classifier. The validation rows are the
//! tail of the training arrays, cut off before any shuffling; the remaining
//! rows are reshuffled every epoch.

use ndarray::{s, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::logic::config::TrainingConfig;
use crate::logic::error::{PipelineError, PipelineResult};
use super::loss::{accuracy, categorical_crossentropy, correct_count, softmax_crossentropy_grad};
use super::network::Sequential;
use super::optimizer::Adam;

// ============================================================================
// HISTORY
// ============================================================================

/// Metrics of one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
    pub val_loss: Option<f32>,
    pub val_accuracy: Option<f32>,
}

impl EpochMetrics {
    /// Progress line, e.g. `Epoch 7/50 - loss: 0.4213 - accuracy: 0.8438 - ...`
    pub fn progress_line(&self, total_epochs: usize) -> String {
        let mut line = format!(
            "Epoch {}/{} - loss: {:.4} - accuracy: {:.4}",
            self.epoch, total_epochs, self.loss, self.accuracy
        );
        if let (Some(vl), Some(va)) = (self.val_loss, self.val_accuracy) {
            line.push_str(&format!(" - val_loss: {:.4} - val_accuracy: {:.4}", vl, va));
        }
        line
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }
}

// ============================================================================
// FIT / EVALUATE
// ============================================================================

/// Rows kept for training when `validation_split` is held out: `floor(n * (1 - split))`
pub fn validation_cut(n: usize, validation_split: f64) -> usize {
    ((n as f64 * (1.0 - validation_split)).floor() as usize).min(n)
}

fn check_shapes(model: &Sequential, x: &Array2<f32>, y: &Array2<f32>) -> PipelineResult<()> {
    if x.nrows() == 0 {
        return Err(PipelineError::EmptyDataset);
    }
    if x.nrows() != y.nrows() {
        return Err(PipelineError::invalid(format!(
            "{} feature rows but {} target rows",
            x.nrows(),
            y.nrows()
        )));
    }
    if x.ncols() != model.input_dim() || y.ncols() != model.output_dim() {
        return Err(PipelineError::invalid(format!(
            "data is {}→{}, network is {}→{}",
            x.ncols(),
            y.ncols(),
            model.input_dim(),
            model.output_dim()
        )));
    }
    Ok(())
}

/// Train `model` on (x, y) and return per-epoch metrics
pub fn fit(
    model: &mut Sequential,
    x: &Array2<f32>,
    y: &Array2<f32>,
    config: &TrainingConfig,
) -> PipelineResult<History> {
    config.validate()?;
    check_shapes(model, x, y)?;

    let cut = validation_cut(x.nrows(), config.validation_split);
    if cut == 0 {
        return Err(PipelineError::invalid("validation split leaves no training rows"));
    }

    let x_train = x.slice(s![..cut, ..]).to_owned();
    let y_train = y.slice(s![..cut, ..]).to_owned();
    let validation = if cut < x.nrows() {
        Some((x.slice(s![cut.., ..]).to_owned(), y.slice(s![cut.., ..]).to_owned()))
    } else {
        None
    };

    log::info!(
        "Training on {} rows, validating on {} rows ({} epochs, batch {})",
        cut,
        x.nrows() - cut,
        config.epochs,
        config.batch_size
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut optimizer = Adam::new(config.learning_rate);
    let mut indices: Vec<usize> = (0..cut).collect();
    let mut history = History::default();

    for epoch in 1..=config.epochs {
        indices.shuffle(&mut rng);

        let mut loss_sum = 0.0f32;
        let mut correct = 0usize;

        for batch in indices.chunks(config.batch_size) {
            let xb = x_train.select(Axis(0), batch);
            let yb = y_train.select(Axis(0), batch);

            let probs = model.forward(&xb, &mut rng)?;
            loss_sum += categorical_crossentropy(&probs, &yb) * batch.len() as f32;
            correct += correct_count(&probs, &yb);

            let grads = model.backward(softmax_crossentropy_grad(&probs, &yb))?;
            model.apply_gradients(&grads, &mut optimizer);

            log::trace!("epoch {} step {} batch {}", epoch, optimizer.timestep(), batch.len());
        }

        let (val_loss, val_accuracy) = match &validation {
            Some((xv, yv)) => {
                let (l, a) = evaluate(model, xv, yv)?;
                (Some(l), Some(a))
            }
            None => (None, None),
        };

        let metrics = EpochMetrics {
            epoch,
            loss: loss_sum / cut as f32,
            accuracy: correct as f32 / cut as f32,
            val_loss,
            val_accuracy,
        };

        if config.verbose {
            println!("{}", metrics.progress_line(config.epochs));
        }
        log::debug!("{}", metrics.progress_line(config.epochs));

        history.epochs.push(metrics);
    }

    Ok(history)
}

/// (loss, accuracy) in inference mode
pub fn evaluate(model: &Sequential, x: &Array2<f32>, y: &Array2<f32>) -> PipelineResult<(f32, f32)> {
    check_shapes(model, x, y)?;
    let probs = model.predict(x)?;
    let loss = categorical_crossentropy(&probs, y);
    Ok((loss, accuracy(&probs, y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Two well separated blobs, class 0 around (+1, +1), class 1 around (-1, -1)
    fn blobs(n: usize) -> (Array2<f32>, Array2<f32>) {
        let mut x = Array2::<f32>::zeros((n, 2));
        let mut y = Array2::<f32>::zeros((n, 2));
        for i in 0..n {
            let jitter = (i % 7) as f32 * 0.05;
            let (sign, class) = if i % 2 == 0 { (1.0, 0) } else { (-1.0, 1) };
            x[[i, 0]] = sign * (1.0 + jitter);
            x[[i, 1]] = sign * (1.0 - jitter);
            y[[i, class]] = 1.0;
        }
        (x, y)
    }

    fn quiet(epochs: usize) -> TrainingConfig {
        TrainingConfig {
            epochs,
            batch_size: 8,
            validation_split: 0.25,
            learning_rate: 0.01,
            seed: 3,
            verbose: false,
        }
    }

    #[test]
    fn test_validation_cut() {
        assert_eq!(validation_cut(800, 0.2), 640);
        assert_eq!(validation_cut(10, 0.25), 7);
        assert_eq!(validation_cut(801, 0.2), 640);
        assert_eq!(validation_cut(7, 0.5), 3);
        assert_eq!(validation_cut(10, 0.0), 10);
    }

    #[test]
    fn test_fit_records_history() {
        let (x, y) = blobs(64);
        let mut model = Sequential::classifier(2, &[8], 2, 0.0, 1).unwrap();
        let history = fit(&mut model, &x, &y, &quiet(30)).unwrap();

        assert_eq!(history.len(), 30);
        let last = history.last().unwrap();
        assert!(last.val_loss.is_some());
        assert!(last.loss < history.epochs[0].loss);
        assert!(last.val_accuracy.unwrap() > 0.9);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = blobs(40);
        let mut a = Sequential::classifier(2, &[8], 2, 0.2, 1).unwrap();
        let mut b = Sequential::classifier(2, &[8], 2, 0.2, 1).unwrap();
        let ha = fit(&mut a, &x, &y, &quiet(5)).unwrap();
        let hb = fit(&mut b, &x, &y, &quiet(5)).unwrap();
        assert_eq!(ha.epochs, hb.epochs);
    }

    #[test]
    fn test_no_validation_split() {
        let (x, y) = blobs(16);
        let mut model = Sequential::classifier(2, &[4], 2, 0.0, 1).unwrap();
        let config = TrainingConfig {
            validation_split: 0.0,
            ..quiet(2)
        };
        let history = fit(&mut model, &x, &y, &config).unwrap();
        assert!(history.last().unwrap().val_accuracy.is_none());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let (x, y) = blobs(16);
        let mut model = Sequential::classifier(2, &[4], 2, 0.0, 1).unwrap();

        let empty = Array2::<f32>::zeros((0, 2));
        assert!(matches!(
            fit(&mut model, &empty, &empty, &quiet(1)),
            Err(PipelineError::EmptyDataset)
        ));

        let short_y = y.slice(s![..8, ..]).to_owned();
        assert!(fit(&mut model, &x, &short_y, &quiet(1)).is_err());

        let wide = Array2::<f32>::zeros((16, 3));
        assert!(fit(&mut model, &wide, &y, &quiet(1)).is_err());

        assert!(fit(&mut model, &x, &y, &quiet(0)).is_err());
    }

    #[test]
    fn test_progress_line_format() {
        let m = EpochMetrics {
            epoch: 7,
            loss: 0.42131,
            accuracy: 0.84375,
            val_loss: Some(0.399),
            val_accuracy: Some(0.8625),
        };
        assert_eq!(
            m.progress_line(50),
            "Epoch 7/50 - loss: 0.4213 - accuracy: 0.8438 - val_loss: 0.3990 - val_accuracy: 0.8625"
        );
    }
}
