use crate::error::EnrollError;

/// Criteria for registration completion detection.
///
/// Immutable after load; shared read-only across concurrent analyses.
#[derive(Debug, Clone)]
pub struct CompletionCriteria {
    /// Number of samples required to complete enrollment.
    pub required_samples: usize,
    /// Per-sample quality floor.
    pub min_quality_score: f32,
    /// Required average quality across the sample set.
    pub min_average_quality: f32,
    /// Maximum tolerated standard deviation of quality scores.
    pub quality_consistency_threshold: f32,
    /// When set, the minimum sample count alone completes enrollment.
    pub allow_quality_override: bool,
    /// Confidence required for completion (and for confirming a
    /// persisted completion status).
    pub completion_confidence_threshold: f32,
}

impl Default for CompletionCriteria {
    fn default() -> Self {
        Self {
            required_samples: 3,
            min_quality_score: 0.7,
            min_average_quality: 0.75,
            quality_consistency_threshold: 0.15,
            allow_quality_override: false,
            completion_confidence_threshold: 0.85,
        }
    }
}

impl CompletionCriteria {
    /// Reads criteria from `VOICEKEY_ENROLL_*` environment variables,
    /// falling back to defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            required_samples: env_usize("VOICEKEY_ENROLL_REQUIRED_SAMPLES", d.required_samples),
            min_quality_score: env_f32("VOICEKEY_ENROLL_MIN_QUALITY", d.min_quality_score),
            min_average_quality: env_f32(
                "VOICEKEY_ENROLL_MIN_AVERAGE_QUALITY",
                d.min_average_quality,
            ),
            quality_consistency_threshold: env_f32(
                "VOICEKEY_ENROLL_CONSISTENCY_THRESHOLD",
                d.quality_consistency_threshold,
            ),
            allow_quality_override: env_bool(
                "VOICEKEY_ENROLL_ALLOW_QUALITY_OVERRIDE",
                d.allow_quality_override,
            ),
            completion_confidence_threshold: env_f32(
                "VOICEKEY_ENROLL_CONFIDENCE_THRESHOLD",
                d.completion_confidence_threshold,
            ),
        }
    }

    pub fn with_required_samples(mut self, count: usize) -> Self {
        self.required_samples = count;
        self
    }

    pub fn with_min_average_quality(mut self, quality: f32) -> Self {
        self.min_average_quality = quality;
        self
    }

    pub fn with_quality_override(mut self, allow: bool) -> Self {
        self.allow_quality_override = allow;
        self
    }

    pub fn validate(&self) -> Result<(), EnrollError> {
        if self.required_samples == 0 {
            return Err(EnrollError::InvalidCriteria(
                "required_samples must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("min_quality_score", self.min_quality_score),
            ("min_average_quality", self.min_average_quality),
            (
                "completion_confidence_threshold",
                self.completion_confidence_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EnrollError::InvalidCriteria(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.quality_consistency_threshold <= 0.0 {
            return Err(EnrollError::InvalidCriteria(
                "quality_consistency_threshold must be positive".to_string(),
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
        assert!(CompletionCriteria::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_required_samples() {
        let c = CompletionCriteria::default().with_required_samples(0);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        let c = CompletionCriteria::default().with_min_average_quality(1.2);
        assert!(c.validate().is_err());
    }
}
