//! Pipeline configuration
//!
//! Defaults come from `constants.rs`. Each field can be overridden from the
//! environment; values that fail to parse keep the default.

use std::env;
use std::path::PathBuf;

use crate::constants::*;
use super::error::{PipelineError, PipelineResult};

/// Training hyperparameters
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub validation_split: f64,
    pub learning_rate: f32,
    pub seed: u64,
    /// Print one progress line per epoch
    pub verbose: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            validation_split: DEFAULT_VALIDATION_SPLIT,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: DEFAULT_SEED,
            verbose: true,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.epochs == 0 {
            return Err(PipelineError::invalid("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::invalid("batch_size must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(PipelineError::invalid(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            )));
        }
        if !(self.learning_rate > 0.0) {
            return Err(PipelineError::invalid("learning_rate must be positive"));
        }
        Ok(())
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of synthetic samples
    pub samples: usize,

    /// Seed for generation and split
    pub seed: u64,

    /// Held-out test fraction
    pub test_size: f64,

    /// Dropout rate after each hidden layer
    pub dropout_rate: f32,

    /// Where the model directory is written
    pub model_dir: PathBuf,

    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLE_COUNT,
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
            dropout_rate: DEFAULT_DROPOUT_RATE,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.samples = parse_var("ADDICTION_SAMPLES").unwrap_or(config.samples);
        config.seed = parse_var("ADDICTION_SEED").unwrap_or(config.seed);
        config.training.seed = config.seed;
        config.training.epochs = parse_var("ADDICTION_EPOCHS").unwrap_or(config.training.epochs);
        config.training.batch_size =
            parse_var("ADDICTION_BATCH_SIZE").unwrap_or(config.training.batch_size);
        config.training.learning_rate =
            parse_var("ADDICTION_LEARNING_RATE").unwrap_or(config.training.learning_rate);

        if let Ok(dir) = env::var("ADDICTION_MODEL_DIR") {
            if !dir.trim().is_empty() {
                config.model_dir = PathBuf::from(dir);
            }
        }

        config
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.samples == 0 {
            return Err(PipelineError::invalid("samples must be at least 1"));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::invalid(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err(PipelineError::invalid(format!(
                "dropout_rate must be in [0, 1), got {}",
                self.dropout_rate
            )));
        }
        self.training.validate()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.samples, 1000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.training.epochs, 50);
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.model_dir, PathBuf::from("smartphone_addiction_model"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env_without_overrides_keeps_defaults() {
        // Only meaningful when none of the overrides is set for the test run
        let keys = [
            "ADDICTION_SAMPLES",
            "ADDICTION_SEED",
            "ADDICTION_EPOCHS",
            "ADDICTION_BATCH_SIZE",
            "ADDICTION_LEARNING_RATE",
            "ADDICTION_MODEL_DIR",
        ];
        if keys.iter().any(|k| env::var_os(k).is_some()) {
            return;
        }
        let config = PipelineConfig::from_env();
        let defaults = PipelineConfig::default();
        assert_eq!(config.samples, defaults.samples);
        assert_eq!(config.seed, defaults.seed);
        assert_eq!(config.training.seed, defaults.training.seed);
        assert_eq!(config.training.epochs, defaults.training.epochs);
        assert_eq!(config.training.batch_size, defaults.training.batch_size);
        assert_eq!(config.training.learning_rate, defaults.training.learning_rate);
        assert_eq!(config.model_dir, defaults.model_dir);
    }

    #[test]
    fn test_parse_var_ignores_garbage() {
        env::set_var("ADDICTION_CONFIG_TEST_GARBAGE", "forty-two");
        assert_eq!(parse_var::<usize>("ADDICTION_CONFIG_TEST_GARBAGE"), None);
        env::set_var("ADDICTION_CONFIG_TEST_NUMBER", " 64 ");
        assert_eq!(parse_var::<usize>("ADDICTION_CONFIG_TEST_NUMBER"), Some(64));
        assert_eq!(parse_var::<usize>("ADDICTION_CONFIG_TEST_UNSET"), None);
    }

    #[test]
    fn test_reject_bad_values() {
        let mut config = PipelineConfig::default();
        config.test_size = 1.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.training.batch_size = 0;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.training.validation_split = -0.1;
        assert!(config.validate().is_err());
    }
}
