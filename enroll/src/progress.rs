use serde::{Deserialize, Serialize};

use crate::types::{CompletionAnalysis, QualityTrend};

/// Coarse registration state derived from a completion analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// No samples collected yet.
    Pending,
    InProgress,
    Complete,
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// Enrollment progress snapshot, projected from a [`CompletionAnalysis`]
/// for status reporting and notification selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub status: RegistrationStatus,
    pub samples_collected: usize,
    pub samples_required: usize,
    pub samples_remaining: usize,
    pub completion_percentage: f32,
    pub average_quality: f32,
    pub quality_trend: QualityTrend,
}

impl ProgressReport {
    pub fn from_analysis(analysis: &CompletionAnalysis) -> Self {
        let status = if analysis.is_complete {
            RegistrationStatus::Complete
        } else if analysis.basic.samples_collected == 0 {
            RegistrationStatus::Pending
        } else {
            RegistrationStatus::InProgress
        };

        Self {
            status,
            samples_collected: analysis.basic.samples_collected,
            samples_required: analysis.basic.samples_required,
            samples_remaining: analysis.basic.samples_remaining,
            completion_percentage: analysis.basic.completion_percentage,
            average_quality: analysis.quality.average_quality,
            quality_trend: analysis.consistency.trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use voicekey_sample::{Embedding, StoredSample};

    use crate::analyzer::CompletionAnalyzer;

    use super::*;

    fn samples(qualities: &[f32]) -> Vec<StoredSample> {
        qualities
            .iter()
            .map(|&q| {
                StoredSample::new(Embedding::new(vec![0.1, 0.2]).unwrap(), q, HashMap::new())
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_status_progression() {
        let analyzer = CompletionAnalyzer::new();

        let pending = ProgressReport::from_analysis(&analyzer.analyze(&[]));
        assert_eq!(pending.status, RegistrationStatus::Pending);

        let in_progress = ProgressReport::from_analysis(&analyzer.analyze(&samples(&[0.9])));
        assert_eq!(in_progress.status, RegistrationStatus::InProgress);
        assert_eq!(in_progress.samples_remaining, 2);

        let complete =
            ProgressReport::from_analysis(&analyzer.analyze(&samples(&[0.9, 0.9, 0.9])));
        assert_eq!(complete.status, RegistrationStatus::Complete);
    }

    #[test]
    fn registration_status_display() {
        assert_eq!(RegistrationStatus::Pending.to_string(), "pending");
        assert_eq!(RegistrationStatus::InProgress.to_string(), "in_progress");
        assert_eq!(RegistrationStatus::Complete.to_string(), "complete");
    }
}
