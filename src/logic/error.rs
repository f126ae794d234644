//! Error handling

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    // I/O and encoding errors
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shape Error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    // Input errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("{0} used before fit")]
    NotFitted(&'static str),

    #[error("Unknown class label: {0}")]
    UnknownClass(String),

    // Model file errors
    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), got v{actual_version} ({actual_hash:08x})")]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("Unsupported model format version: {0}")]
    UnsupportedFormat(u32),
}

impl PipelineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PipelineError::InvalidConfig(msg.into())
    }
}
