use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::SampleError;

/// One enrolled voice sample owned by a user's sample set.
///
/// Append-only: samples are never mutated after creation, only deleted
/// individually when the underlying audio is deleted. Insertion order
/// within a user's set is significant (quality trend analysis).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSample {
    pub embedding: Embedding,

    /// Estimated sample fidelity in [0.0, 1.0], produced alongside the
    /// embedding by the external generator.
    pub quality: f32,

    pub created_at: DateTime<Utc>,

    /// Opaque source metadata (file name, size, processor tag, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl StoredSample {
    /// Creates a sample stamped with the current time.
    /// Returns [`SampleError::QualityOutOfRange`] for a quality score
    /// outside [0.0, 1.0].
    pub fn new(
        embedding: Embedding,
        quality: f32,
        metadata: HashMap<String, String>,
    ) -> Result<Self, SampleError> {
        Self::with_created_at(embedding, quality, Utc::now(), metadata)
    }

    /// Creates a sample with an explicit timestamp.
    pub fn with_created_at(
        embedding: Embedding,
        quality: f32,
        created_at: DateTime<Utc>,
        metadata: HashMap<String, String>,
    ) -> Result<Self, SampleError> {
        if !(0.0..=1.0).contains(&quality) || quality.is_nan() {
            return Err(SampleError::QualityOutOfRange(quality));
        }
        Ok(Self {
            embedding,
            quality,
            created_at,
            metadata,
        })
    }

    /// Whether this sample meets the given quality floor.
    pub fn is_high_quality(&self, threshold: f32) -> bool {
        self.quality >= threshold
    }
}
