//! Features Module - feature schema and the Sample type
//!
//! Every feature matrix in the crate is laid out by `layout::FEATURE_LAYOUT`.

pub mod layout;
pub mod sample;

// Re-export common types
pub use layout::{LayoutInfo, FEATURE_COUNT};
pub use sample::Sample;
