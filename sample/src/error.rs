use thiserror::Error;

/// Errors raised when constructing sample data types.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("embedding must not be empty")]
    EmptyEmbedding,

    #[error("quality score out of range: {0} (expected 0.0..=1.0)")]
    QualityOutOfRange(f32),
}
