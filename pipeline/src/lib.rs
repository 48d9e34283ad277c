//! Staged registration pipeline for voice sample ingestion.
//!
//! # Architecture
//!
//! One incoming audio-upload event runs through five ordered stages,
//! each independently recorded in the [`PipelineRun`]:
//!
//! 1. [`Stage::ExtractIdentity`]: owning user id from the event key
//! 2. [`Stage::FetchAndValidate`]: raw audio bytes from the
//!    [`AudioStore`], checked by the [`AudioValidator`]
//! 3. [`Stage::GenerateEmbedding`]: [`EmbeddingGenerator`] produces an
//!    embedding plus quality score
//! 4. [`Stage::PersistSample`]: atomic append through the
//!    [`SampleRepository`]; the returned count is authoritative
//! 5. [`Stage::ReevaluateCompletion`]: completion analysis over the full
//!    sample set, status persistence, best-effort notification
//!
//! A stage failure aborts the remaining stages for that event; the run
//! is reported failed with the failing stage identified. Stages run
//! strictly sequentially within one run, while independent runs may
//! execute concurrently: the pipeline holds no shared mutable state
//! beyond read-only configuration.
//!
//! Every collaborator call is bounded by the configured timeout.
//! [`Pipeline::process_with_retry`] retries the whole pipeline with
//! exponential backoff; individual stages are never retried, since
//! side effects must be re-derivable from the same immutable audio.

mod config;
mod error;
mod event;
pub mod mem;
mod notify;
mod pipeline;
mod ports;
mod run;

pub use config::PipelineConfig;
pub use error::{
    EmbedError, NotifyError, PipelineError, RepoError, StoreError, ValidatorError,
};
pub use event::UploadEvent;
pub use notify::Notification;
pub use pipeline::Pipeline;
pub use ports::{
    AudioMetadata, AudioStore, AudioValidator, EmbeddingGenerator, FetchedAudio,
    GeneratedEmbedding, Notifier, SampleRepository, StatusUpdate, Validation,
};
pub use run::{PipelineRun, Stage, StageRecord, StageStatus};
