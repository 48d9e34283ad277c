//! Collaborator contracts consumed by the pipeline.
//!
//! All implementations live elsewhere (object storage, embedding model,
//! table storage, delivery channels); the pipeline only depends on
//! these traits. Implementations must be safe for concurrent use
//! (`Send + Sync`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voicekey_enroll::RecordedStatus;
use voicekey_sample::{Embedding, StoredSample};

use crate::error::{EmbedError, NotifyError, RepoError, StoreError, ValidatorError};
use crate::notify::Notification;

// ---------------------------------------------------------------------------
// Port data types
// ---------------------------------------------------------------------------

/// Metadata accompanying a fetched audio object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Raw audio bytes plus metadata from the object store.
#[derive(Debug, Clone)]
pub struct FetchedAudio {
    pub bytes: Vec<u8>,
    pub metadata: AudioMetadata,
}

/// Outcome of format/size/security validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    /// Human-readable issues when invalid.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
        }
    }

    pub fn failed(issues: Vec<String>) -> Self {
        Self {
            is_valid: false,
            issues,
        }
    }
}

/// Embedding plus quality score from the generator.
#[derive(Debug, Clone)]
pub struct GeneratedEmbedding {
    pub embedding: Embedding,
    /// Estimated sample fidelity in [0.0, 1.0].
    pub quality: f32,
}

/// Completion status fields persisted on the user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub registration_complete: bool,
    pub completion_confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Audio object storage.
#[async_trait::async_trait]
pub trait AudioStore: Send + Sync {
    /// Fetches raw audio bytes and metadata for an object key.
    async fn fetch(&self, key: &str) -> Result<FetchedAudio, StoreError>;
}

/// Format/size/security checks prior to embedding generation.
#[async_trait::async_trait]
pub trait AudioValidator: Send + Sync {
    async fn validate(
        &self,
        bytes: &[u8],
        metadata: &AudioMetadata,
    ) -> Result<Validation, ValidatorError>;
}

/// The opaque embedding model.
#[async_trait::async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    async fn generate(
        &self,
        bytes: &[u8],
        metadata: &AudioMetadata,
    ) -> Result<GeneratedEmbedding, EmbedError>;
}

/// Persistence for user sample sets and enrollment status.
#[async_trait::async_trait]
pub trait SampleRepository: Send + Sync {
    /// Returns the user's full sample set in insertion order.
    async fn get_samples(&self, user_id: &str) -> Result<Vec<StoredSample>, RepoError>;

    /// Appends a sample to the user's set and returns the new total.
    ///
    /// MUST be atomic with respect to concurrent appends for the same
    /// user (server-side conditional append or an append-only list
    /// primitive, never read-modify-write). The returned count is the
    /// authoritative post-append total; callers must not substitute a
    /// locally incremented value.
    async fn append_sample(&self, user_id: &str, sample: StoredSample)
        -> Result<usize, RepoError>;

    /// Currently persisted completion status.
    async fn get_status(&self, user_id: &str) -> Result<RecordedStatus, RepoError>;

    async fn set_status(&self, user_id: &str, update: StatusUpdate) -> Result<(), RepoError>;
}

/// Best-effort notification delivery. The pipeline logs and swallows
/// every error from this port.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}
