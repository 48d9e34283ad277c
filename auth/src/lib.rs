//! Voice authentication scoring.
//!
//! # Architecture
//!
//! Authentication of a live voice sample runs in two pure stages:
//!
//! 1. [`AuthScorer::compare_against_stored`]: input embedding vs. the
//!    user's stored sample set -> per-sample similarities + aggregates
//! 2. [`AuthScorer::score_confidence`]: aggregates -> weighted, quality
//!    adjusted confidence score and an [`AuthResult`]
//!
//! [`AuthScorer::authenticate`] composes both and is the single public
//! entry point. All of it is CPU-only and performs no I/O; transient
//! collaborator failures are the registration pipeline's concern, never
//! retried here.
//!
//! # Scoring
//!
//! ```text
//! base       = avg_similarity * weight_average + max_similarity * weight_max
//! adjustment = (quality_weighted_avg - avg_similarity) * quality_score_weight
//! boost      = min(0.05, (comparisons - 1) * 0.01)
//! confidence = clamp(base + adjustment + boost, 0.0, 1.0)
//! ```
//!
//! The final clamp is load-bearing: the additive terms may leave [0, 1]
//! in unusual configurations.

pub mod cosine;
mod config;
mod error;
mod scorer;
mod types;

pub use config::AuthConfig;
pub use cosine::cosine_similarity;
pub use error::AuthError;
pub use scorer::AuthScorer;
pub use types::{AuthDecision, AuthResult, ComparisonResult, SimilarityComparison};
