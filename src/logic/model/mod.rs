//! Model Module - dense risk classifier
//!
//! - `layers` / `network` - Dense + Dropout stack
//! - `optimizer` / `loss` / `training` - Adam, cross-entropy, fit/evaluate
//! - `storage` / `inference` - model directory and predictions on raw samples

pub mod inference;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod storage;
pub mod training;


// Re-export common types
pub use inference::{InferenceEngine, RiskPredictor, RulePredictor};
pub use network::Sequential;
pub use storage::{save_model, SavedModel, TrainingSummary};
pub use training::{evaluate, fit, History};
