//! Dataset Module - synthetic training data
//!
//! Generates labelled smartphone-usage samples and splits them for training.
//! Pure in-memory work, nothing here touches the filesystem.

pub mod generator;
pub mod label;
pub mod record;
pub mod split;


pub use generator::generate;
pub use label::RiskLabel;
pub use record::Dataset;
pub use split::train_test_split;
