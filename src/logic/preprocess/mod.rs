//! Preprocess Module - feature scaling and label encoding

pub mod encoder;
pub mod scaler;

pub use encoder::{to_categorical, LabelEncoder};
pub use scaler::StandardScaler;
