use thiserror::Error;

/// Errors returned by authentication scoring operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("embedding must not be empty")]
    EmptyEmbedding,

    #[error("embedding dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("insufficient stored samples: {got} < {need}")]
    InsufficientData { got: usize, need: usize },

    #[error("no valid comparisons could be computed")]
    NoValidComparisons,

    #[error("invalid auth config: {0}")]
    InvalidConfig(String),
}
