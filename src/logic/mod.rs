//! Logic Module - data generation, preprocessing, model and pipeline
//!
//! - `features/` - feature layout and the Sample type
//! - `dataset/` - synthetic samples, risk labels, train/test split
//! - `preprocess/` - scaler and label encoding
//! - `model/` - dense network, training, storage, inference

pub mod config;
pub mod error;
pub mod pipeline;

pub mod dataset;
pub mod features;
pub mod model;
pub mod preprocess;
