use thiserror::Error;
use voicekey_sample::SampleError;

use crate::run::Stage;

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Errors from the audio object store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("audio object not found: {0}")]
    NotFound(String),

    #[error("audio object too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Infrastructure errors from the pre-embedding validator.
/// A *failed validation* is not an error here; see [`Validation`].
///
/// [`Validation`]: crate::ports::Validation
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("validator backend error: {0}")]
    Backend(String),
}

/// Errors from the embedding generator.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("audio quality too low: {0}")]
    LowQuality(f32),

    #[error("embedding generation failed: {0}")]
    ProcessingFailed(String),
}

/// Errors from the sample repository.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("repository backend error: {0}")]
    Backend(String),
}

/// Errors from the notification channel. Always logged and swallowed
/// by the pipeline, never propagated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// A stage failure. Aborts the current run; retryable at the
/// whole-pipeline level only.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline: invalid event: {0}")]
    InvalidEvent(String),

    #[error("pipeline: audio validation failed: {0}")]
    ValidationFailed(String),

    #[error("pipeline: stage {stage} timed out after {seconds}s")]
    Timeout { stage: Stage, seconds: u64 },

    #[error("pipeline: {0}")]
    Store(#[from] StoreError),

    #[error("pipeline: {0}")]
    Validator(#[from] ValidatorError),

    #[error("pipeline: {0}")]
    Embed(#[from] EmbedError),

    #[error("pipeline: {0}")]
    Repo(#[from] RepoError),

    #[error("pipeline: invalid sample data: {0}")]
    Sample(#[from] SampleError),
}
