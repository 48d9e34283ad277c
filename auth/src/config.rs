use crate::error::AuthError;

/// Configuration for [`AuthScorer`](crate::AuthScorer).
///
/// Immutable after load; safe to share read-only across concurrent
/// authentication calls.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Minimum similarity to consider a single comparison a match.
    pub min_similarity_threshold: f32,
    /// Confidence at or above which a decision is flagged high-confidence.
    pub high_confidence_threshold: f32,
    /// Final confidence threshold for authentication.
    pub authentication_threshold: f32,

    /// Minimum number of stored samples required to attempt a comparison.
    pub min_stored_samples: usize,
    /// Include the average similarity in the weighted score.
    pub use_average_scoring: bool,
    /// Include the maximum similarity in the weighted score.
    pub use_max_scoring: bool,
    pub weight_average: f32,
    pub weight_max: f32,

    /// Weight of the quality adjustment in the final score.
    pub quality_score_weight: f32,
    /// Expected embedding dimensions. A mismatch only warns.
    pub expected_dimensions: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_similarity_threshold: 0.75,
            high_confidence_threshold: 0.85,
            authentication_threshold: 0.80,
            min_stored_samples: 1,
            use_average_scoring: true,
            use_max_scoring: true,
            weight_average: 0.6,
            weight_max: 0.4,
            quality_score_weight: 0.1,
            expected_dimensions: 256,
        }
    }
}

impl AuthConfig {
    /// Reads configuration from `VOICEKEY_AUTH_*` environment variables,
    /// falling back to defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            min_similarity_threshold: env_f32(
                "VOICEKEY_AUTH_MIN_SIMILARITY",
                d.min_similarity_threshold,
            ),
            high_confidence_threshold: env_f32(
                "VOICEKEY_AUTH_HIGH_CONFIDENCE",
                d.high_confidence_threshold,
            ),
            authentication_threshold: env_f32(
                "VOICEKEY_AUTH_THRESHOLD",
                d.authentication_threshold,
            ),
            min_stored_samples: env_usize("VOICEKEY_AUTH_MIN_SAMPLES", d.min_stored_samples),
            use_average_scoring: env_bool("VOICEKEY_AUTH_USE_AVERAGE", d.use_average_scoring),
            use_max_scoring: env_bool("VOICEKEY_AUTH_USE_MAX", d.use_max_scoring),
            weight_average: env_f32("VOICEKEY_AUTH_WEIGHT_AVG", d.weight_average),
            weight_max: env_f32("VOICEKEY_AUTH_WEIGHT_MAX", d.weight_max),
            quality_score_weight: env_f32("VOICEKEY_AUTH_QUALITY_WEIGHT", d.quality_score_weight),
            expected_dimensions: env_usize("VOICEKEY_AUTH_DIMENSIONS", d.expected_dimensions),
        }
    }

    pub fn with_authentication_threshold(mut self, threshold: f32) -> Self {
        self.authentication_threshold = threshold;
        self
    }

    pub fn with_min_stored_samples(mut self, min: usize) -> Self {
        self.min_stored_samples = min;
        self
    }

    pub fn with_weights(mut self, average: f32, max: f32) -> Self {
        self.weight_average = average;
        self.weight_max = max;
        self
    }

    /// Validates threshold ranges and the sample floor.
    pub fn validate(&self) -> Result<(), AuthError> {
        for (name, value) in [
            ("min_similarity_threshold", self.min_similarity_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("authentication_threshold", self.authentication_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AuthError::InvalidConfig(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.min_stored_samples == 0 {
            return Err(AuthError::InvalidConfig(
                "min_stored_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => v.eq_ignore_ascii_case("true") || v == "1",
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let cfg = AuthConfig::default().with_authentication_threshold(1.5);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sample_floor() {
        let cfg = AuthConfig::default().with_min_stored_samples(0);
        assert!(cfg.validate().is_err());
    }
}
