use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AuthResult
// ---------------------------------------------------------------------------

/// Outcome of an authentication decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthResult {
    Authenticated,
    Rejected,
    /// Fewer valid comparisons than the configured sample floor.
    InsufficientData,
}

impl std::fmt::Display for AuthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authenticated => f.write_str("authenticated"),
            Self::Rejected => f.write_str("rejected"),
            Self::InsufficientData => f.write_str("insufficient_data"),
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison results
// ---------------------------------------------------------------------------

/// One stored sample compared against the input embedding.
/// Ephemeral, produced per authentication call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityComparison {
    /// Position of the sample in the user's stored set.
    pub index: usize,
    /// Similarity in [0, 1].
    pub similarity: f32,
    /// Quality score of the stored sample.
    pub quality: f32,
    #[serde(rename = "created_at")]
    pub sample_created_at: DateTime<Utc>,
}

/// Aggregated result of comparing an input embedding against a user's
/// stored sample set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub average_similarity: f32,
    pub max_similarity: f32,
    pub min_similarity: f32,
    /// Sum(similarity * quality) / Sum(quality); falls back to the plain
    /// average when all qualities are zero.
    pub quality_weighted_average: f32,
    /// Number of comparisons that produced a valid similarity.
    pub total_comparisons: usize,
    pub comparisons: Vec<SimilarityComparison>,
}

// ---------------------------------------------------------------------------
// AuthDecision
// ---------------------------------------------------------------------------

/// Final authentication decision. One per authentication request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthDecision {
    /// Weighted, quality-adjusted match strength in [0, 1].
    pub confidence: f32,
    pub result: AuthResult,
    /// Whether confidence reached the authentication threshold.
    pub meets_threshold: bool,
    /// Whether confidence reached the high-confidence threshold.
    pub is_high_confidence: bool,
    pub comparisons: Vec<SimilarityComparison>,
}
