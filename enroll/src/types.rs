use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sub-check reports
// ---------------------------------------------------------------------------

/// Sample-count completion check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicCompletion {
    pub samples_collected: usize,
    pub samples_required: usize,
    pub samples_remaining: usize,
    pub has_minimum_samples: bool,
    /// Collected / required, capped at 100.
    pub completion_percentage: f32,
}

/// Distribution of quality scores across the sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub min_score: f32,
    pub max_score: f32,
    pub median_score: f32,
    pub score_range: f32,
    pub above_threshold_count: usize,
}

/// Quality-based completion check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCompletion {
    /// Whether enough samples meet the per-sample quality floor.
    pub has_quality_samples: bool,
    pub quality_samples_count: usize,
    pub average_quality: f32,
    /// Whether the average quality meets the configured target.
    pub min_quality_met: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<QualityDistribution>,
}

/// Direction of quality across insertion order, comparing the mean of
/// the first half of samples against the second half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for QualityTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Improving => f.write_str("improving"),
            Self::Declining => f.write_str("declining"),
            Self::Stable => f.write_str("stable"),
            Self::InsufficientData => f.write_str("insufficient_data"),
        }
    }
}

/// Consistency completion check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyCompletion {
    pub is_consistent: bool,
    /// 1 - stddev/threshold, clamped to [0, 1].
    pub consistency_score: f32,
    /// Population standard deviation of quality scores.
    pub quality_stddev: f32,
    pub trend: QualityTrend,
}

// ---------------------------------------------------------------------------
// CompletionAnalysis
// ---------------------------------------------------------------------------

/// Full enrollment completion analysis.
///
/// Recomputed from scratch on every invocation; never the source of
/// truth, only a projection the caller may cache on the user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionAnalysis {
    pub is_complete: bool,
    pub completion_confidence: f32,
    /// Overall 0-1 registration quality summary; informational, does
    /// not gate completion.
    pub registration_score: f32,
    pub basic: BasicCompletion,
    pub quality: QualityCompletion,
    pub consistency: ConsistencyCompletion,
    /// Ordered, human-readable guidance for failing sub-checks.
    /// Empty when enrollment is complete.
    pub recommendations: Vec<String>,
}

impl CompletionAnalysis {
    pub fn samples_collected(&self) -> usize {
        self.basic.samples_collected
    }

    pub fn samples_required(&self) -> usize {
        self.basic.samples_required
    }

    pub fn samples_remaining(&self) -> usize {
        self.basic.samples_remaining
    }
}

// ---------------------------------------------------------------------------
// RecordedStatus
// ---------------------------------------------------------------------------

/// Completion status as currently persisted on the user record.
///
/// Explicit value rather than optional attributes: absent fields in the
/// store map to `false` on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedStatus {
    pub complete: bool,
    /// Whether a completion with sufficient confidence has already been
    /// confirmed on the record.
    pub confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_trend_display() {
        assert_eq!(QualityTrend::Improving.to_string(), "improving");
        assert_eq!(QualityTrend::Declining.to_string(), "declining");
        assert_eq!(QualityTrend::Stable.to_string(), "stable");
        assert_eq!(QualityTrend::InsufficientData.to_string(), "insufficient_data");
    }
}
