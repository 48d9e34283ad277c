//! Registration completion analysis for voice enrollment.
//!
//! Decides when a user has collected enough high-quality, consistent
//! voice samples to finish enrollment. Completion goes beyond sample
//! counting:
//!
//! 1. Basic: sample count vs. the required minimum
//! 2. Quality: per-sample quality floor and average quality target
//! 3. Consistency: low variance of quality across samples, plus a
//!    first-half vs. second-half quality trend
//!
//! [`CompletionAnalyzer::analyze`] recomputes the full
//! [`CompletionAnalysis`] from scratch on every invocation; the result
//! is never authoritative state, only a projection the caller may cache.
//! [`CompletionAnalyzer::should_trigger_update`] tells the caller when
//! a recomputed analysis warrants persisting a status change.

mod analyzer;
mod criteria;
mod error;
mod progress;
mod types;

pub use analyzer::CompletionAnalyzer;
pub use criteria::CompletionCriteria;
pub use error::EnrollError;
pub use progress::{ProgressReport, RegistrationStatus};
pub use types::{
    BasicCompletion, CompletionAnalysis, ConsistencyCompletion, QualityCompletion,
    QualityDistribution, QualityTrend, RecordedStatus,
};
