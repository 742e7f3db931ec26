//! Error types for the core deduplication engine

use thiserror::Error;

/// Core deduplication errors
///
/// Every variant except `AllocationFailed` is a precondition failure and is
/// reported before any output buffer is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("record buffer size overflows: {n} records of {stride} bytes")]
    SizeOverflow { n: usize, stride: usize },

    #[error("record buffer too small: need {required} bytes, got {actual}")]
    DataTooSmall { required: usize, actual: usize },

    #[error("output buffer `{output}` too small: need {required} slots, got {actual}")]
    OutputTooSmall {
        output: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("identity index allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("array must be non-empty")]
    EmptyInput,
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
