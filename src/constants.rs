//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! Running with no environment set reproduces exactly these values.

/// Number of synthetic samples generated per run
pub const DEFAULT_SAMPLE_COUNT: usize = 1000;

/// Seed shared by generation, split, weight init and dropout
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of samples held out for the final test
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Training epochs
pub const DEFAULT_EPOCHS: usize = 50;

/// Mini-batch size
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Fraction of the training split used for per-epoch validation
pub const DEFAULT_VALIDATION_SPLIT: f64 = 0.2;

/// Adam learning rate
pub const DEFAULT_LEARNING_RATE: f32 = 0.001;

/// Dropout rate after each hidden layer
pub const DEFAULT_DROPOUT_RATE: f32 = 0.2;

/// Hidden layer widths
pub const HIDDEN_UNITS: [usize; 2] = [64, 32];

/// Output directory of the saved model
pub const DEFAULT_MODEL_DIR: &str = "smartphone_addiction_model";

/// Model file inside the model directory
pub const MODEL_FILE_NAME: &str = "model.json";

/// Checksum file inside the model directory
pub const CHECKSUM_FILE_NAME: &str = "model.sha256";

/// On-disk model format version
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Smartphone Addiction Risk";
