use tracing::{debug, info, warn};
use voicekey_sample::{Embedding, StoredSample};

use crate::config::AuthConfig;
use crate::cosine::cosine_similarity;
use crate::error::AuthError;
use crate::types::{AuthDecision, AuthResult, ComparisonResult, SimilarityComparison};

/// Compares a live voice embedding against a user's stored samples and
/// renders an authentication decision.
///
/// Holds only read-only configuration; safe to share across concurrent
/// authentication calls. Never mutates stored state and never retries:
/// transient failures are the caller's responsibility.
pub struct AuthScorer {
    config: AuthConfig,
}

impl AuthScorer {
    /// Creates a scorer with default configuration.
    pub fn new() -> Self {
        Self::with_config(AuthConfig::default())
    }

    pub fn with_config(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Complete authentication workflow: comparison plus confidence
    /// scoring. The single public entry point for callers.
    ///
    /// Returns a decision even for the expected `insufficient_data`
    /// outcome; only invalid input (empty stored set below the floor,
    /// or all comparisons skipped) surfaces as an error.
    pub fn authenticate(
        &self,
        input: &Embedding,
        stored: &[StoredSample],
    ) -> Result<AuthDecision, AuthError> {
        info!(
            input_dims = input.dim(),
            stored_count = stored.len(),
            "starting voice authentication"
        );

        let comparison = self.compare_against_stored(input, stored)?;
        let decision = self.score_confidence(comparison);

        info!(
            confidence = decision.confidence,
            result = %decision.result,
            "voice authentication completed"
        );
        Ok(decision)
    }

    /// Compares the input embedding against every stored sample.
    ///
    /// Individual comparison failures (for example a stored sample with
    /// a mismatched dimension) are skipped with a warning so one bad
    /// sample does not block authentication against the rest.
    ///
    /// # Errors
    ///
    /// [`AuthError::InsufficientData`] when the stored set is below the
    /// configured floor, [`AuthError::NoValidComparisons`] when every
    /// comparison was skipped.
    pub fn compare_against_stored(
        &self,
        input: &Embedding,
        stored: &[StoredSample],
    ) -> Result<ComparisonResult, AuthError> {
        if stored.len() < self.config.min_stored_samples {
            return Err(AuthError::InsufficientData {
                got: stored.len(),
                need: self.config.min_stored_samples,
            });
        }

        if input.dim() != self.config.expected_dimensions {
            warn!(
                expected = self.config.expected_dimensions,
                actual = input.dim(),
                "unexpected embedding dimensions"
            );
        }

        let mut comparisons = Vec::with_capacity(stored.len());
        for (i, sample) in stored.iter().enumerate() {
            let similarity =
                match cosine_similarity(input.as_slice(), sample.embedding.as_slice()) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(index = i, error = %e, "skipping stored sample comparison");
                        continue;
                    }
                };

            debug!(index = i, similarity, quality = sample.quality, "compared stored sample");
            comparisons.push(SimilarityComparison {
                index: i,
                similarity,
                quality: sample.quality,
                sample_created_at: sample.created_at,
            });
        }

        if comparisons.is_empty() {
            return Err(AuthError::NoValidComparisons);
        }

        let n = comparisons.len();
        let mut sum = 0.0f64;
        let mut max = f32::MIN;
        let mut min = f32::MAX;
        let mut weighted_sum = 0.0f64;
        let mut weight_sum = 0.0f64;
        for c in &comparisons {
            sum += c.similarity as f64;
            max = max.max(c.similarity);
            min = min.min(c.similarity);
            weighted_sum += c.similarity as f64 * c.quality as f64;
            weight_sum += c.quality as f64;
        }
        let average = (sum / n as f64) as f32;
        let quality_weighted_average = if weight_sum > 0.0 {
            (weighted_sum / weight_sum) as f32
        } else {
            average
        };

        Ok(ComparisonResult {
            average_similarity: average,
            max_similarity: max,
            min_similarity: min,
            quality_weighted_average,
            total_comparisons: n,
            comparisons,
        })
    }

    /// Renders a decision from comparison aggregates.
    ///
    /// Monotonic non-decreasing in both `average_similarity` and
    /// `max_similarity`. The final clamp to [0, 1] must stay the last
    /// operation: the additive adjustment and boost terms can push the
    /// raw sum outside the range.
    pub fn score_confidence(&self, comparison: ComparisonResult) -> AuthDecision {
        let cfg = &self.config;

        let mut base = 0.0f32;
        if cfg.use_average_scoring {
            base += comparison.average_similarity * cfg.weight_average;
        }
        if cfg.use_max_scoring {
            base += comparison.max_similarity * cfg.weight_max;
        }

        let quality_adjustment = (comparison.quality_weighted_average
            - comparison.average_similarity)
            * cfg.quality_score_weight;

        // Small, capped reward for corroborating samples.
        let sample_boost = ((comparison.total_comparisons as f32 - 1.0) * 0.01).min(0.05);

        let confidence = (base + quality_adjustment + sample_boost).clamp(0.0, 1.0);

        let result = if comparison.total_comparisons < cfg.min_stored_samples {
            AuthResult::InsufficientData
        } else if confidence >= cfg.authentication_threshold {
            AuthResult::Authenticated
        } else {
            AuthResult::Rejected
        };

        debug!(
            base,
            quality_adjustment,
            sample_boost,
            confidence,
            result = %result,
            "authentication confidence calculated"
        );

        AuthDecision {
            confidence,
            result,
            meets_threshold: confidence >= cfg.authentication_threshold,
            is_high_confidence: confidence >= cfg.high_confidence_threshold,
            comparisons: comparison.comparisons,
        }
    }
}

impl Default for AuthScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;

    fn sample(values: Vec<f32>, quality: f32) -> StoredSample {
        StoredSample::new(Embedding::new(values).unwrap(), quality, HashMap::new()).unwrap()
    }

    fn comparison(avg: f32, max: f32, qwa: f32, n: usize) -> ComparisonResult {
        ComparisonResult {
            average_similarity: avg,
            max_similarity: max,
            min_similarity: avg.min(max),
            quality_weighted_average: qwa,
            total_comparisons: n,
            comparisons: vec![SimilarityComparison {
                index: 0,
                similarity: max,
                quality: 0.9,
                sample_created_at: Utc::now(),
            }],
        }
    }

    #[test]
    fn test_empty_stored_is_insufficient() {
        let scorer = AuthScorer::new();
        let input = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            scorer.compare_against_stored(&input, &[]),
            Err(AuthError::InsufficientData { got: 0, need: 1 })
        ));
    }

    #[test]
    fn test_identical_single_sample_authenticates() {
        let scorer = AuthScorer::new();
        let input = Embedding::new(vec![0.4, 0.3, 0.8, 0.1]).unwrap();
        let stored = vec![sample(vec![0.4, 0.3, 0.8, 0.1], 0.9)];

        let decision = scorer.authenticate(&input, &stored).unwrap();
        assert_eq!(decision.result, AuthResult::Authenticated);
        assert!(decision.confidence >= scorer.config().authentication_threshold);
        assert!(decision.meets_threshold);
        assert_eq!(decision.comparisons.len(), 1);
    }

    #[test]
    fn test_dissimilar_sample_rejected() {
        let scorer = AuthScorer::new();
        let input = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
        let stored = vec![sample(vec![0.0, 1.0, 0.0], 0.9)];

        let decision = scorer.authenticate(&input, &stored).unwrap();
        assert_eq!(decision.result, AuthResult::Rejected);
        assert!(!decision.meets_threshold);
    }

    #[test]
    fn test_bad_stored_sample_skipped() {
        let scorer = AuthScorer::new();
        let input = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
        // Second sample has a mismatched dimension and must be skipped.
        let stored = vec![
            sample(vec![1.0, 0.0, 0.0], 0.9),
            sample(vec![1.0, 0.0], 0.9),
        ];

        let cmp = scorer.compare_against_stored(&input, &stored).unwrap();
        assert_eq!(cmp.total_comparisons, 1);
        assert_eq!(cmp.comparisons[0].index, 0);
    }

    #[test]
    fn test_all_skipped_is_no_valid_comparisons() {
        let scorer = AuthScorer::new();
        let input = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
        let stored = vec![sample(vec![1.0, 0.0], 0.9), sample(vec![1.0], 0.8)];

        assert!(matches!(
            scorer.compare_against_stored(&input, &stored),
            Err(AuthError::NoValidComparisons)
        ));
    }

    #[test]
    fn test_quality_weighted_average_falls_back_on_zero_weights() {
        let scorer = AuthScorer::new();
        let input = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
        let stored = vec![
            sample(vec![1.0, 0.0, 0.0], 0.0),
            sample(vec![0.9, 0.1, 0.0], 0.0),
        ];

        let cmp = scorer.compare_against_stored(&input, &stored).unwrap();
        assert!((cmp.quality_weighted_average - cmp.average_similarity).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_monotonic_in_average() {
        let scorer = AuthScorer::new();
        let lo = scorer.score_confidence(comparison(0.5, 0.8, 0.5, 3));
        let hi = scorer.score_confidence(comparison(0.7, 0.8, 0.7, 3));
        assert!(hi.confidence >= lo.confidence);
    }

    #[test]
    fn test_confidence_monotonic_in_max() {
        let scorer = AuthScorer::new();
        let lo = scorer.score_confidence(comparison(0.6, 0.6, 0.6, 3));
        let hi = scorer.score_confidence(comparison(0.6, 0.9, 0.6, 3));
        assert!(hi.confidence >= lo.confidence);
    }

    #[test]
    fn test_sample_boost_capped() {
        let scorer = AuthScorer::new();
        let six = scorer.score_confidence(comparison(0.5, 0.5, 0.5, 6));
        let twenty = scorer.score_confidence(comparison(0.5, 0.5, 0.5, 20));
        // Boost saturates at 0.05 from six comparisons onward.
        assert!((six.confidence - twenty.confidence).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_clamped_to_one() {
        // Overweighted config pushes the raw sum past 1.0; the final
        // clamp keeps the decision in range.
        let cfg = AuthConfig::default().with_weights(1.0, 1.0);
        let scorer = AuthScorer::with_config(cfg);
        let decision = scorer.score_confidence(comparison(0.95, 1.0, 0.99, 10));
        assert_eq!(decision.confidence, 1.0);
        assert_eq!(decision.result, AuthResult::Authenticated);
    }

    #[test]
    fn test_insufficient_valid_comparisons_after_skips() {
        let cfg = AuthConfig::default().with_min_stored_samples(2);
        let scorer = AuthScorer::with_config(cfg);
        let input = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
        // Two stored samples pass the floor check, but only one survives
        // comparison, so the decision downgrades to insufficient data.
        let stored = vec![
            sample(vec![1.0, 0.0, 0.0], 0.9),
            sample(vec![1.0, 0.0], 0.9),
        ];

        let cmp = scorer.compare_against_stored(&input, &stored).unwrap();
        let decision = scorer.score_confidence(cmp);
        assert_eq!(decision.result, AuthResult::InsufficientData);
    }

    #[test]
    fn test_high_confidence_flag() {
        let scorer = AuthScorer::new();
        let decision = scorer.score_confidence(comparison(0.95, 0.98, 0.95, 3));
        assert!(decision.is_high_confidence);

        let decision = scorer.score_confidence(comparison(0.81, 0.81, 0.81, 1));
        assert!(decision.meets_threshold);
        assert!(!decision.is_high_confidence);
    }
}
