use tracing::{debug, info};
use voicekey_sample::StoredSample;

use crate::criteria::CompletionCriteria;
use crate::types::{
    BasicCompletion, CompletionAnalysis, ConsistencyCompletion, QualityCompletion,
    QualityDistribution, QualityTrend, RecordedStatus,
};

/// Multi-criteria registration completion detection.
///
/// Pure and deterministic: [`analyze`](Self::analyze) performs no I/O
/// and yields identical results for identical sample sets.
pub struct CompletionAnalyzer {
    criteria: CompletionCriteria,
}

impl CompletionAnalyzer {
    /// Creates an analyzer with default criteria.
    pub fn new() -> Self {
        Self::with_criteria(CompletionCriteria::default())
    }

    pub fn with_criteria(criteria: CompletionCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &CompletionCriteria {
        &self.criteria
    }

    /// Analyzes a user's full sample set and decides whether enrollment
    /// is complete.
    pub fn analyze(&self, samples: &[StoredSample]) -> CompletionAnalysis {
        let basic = self.check_basic(samples);
        let quality = self.check_quality(samples);
        let consistency = self.check_consistency(samples);

        let (is_complete, completion_confidence) =
            self.final_decision(&basic, &quality, &consistency);
        let registration_score = self.registration_score(&basic, &quality, &consistency);

        let recommendations = if is_complete {
            Vec::new()
        } else {
            self.recommendations(completion_confidence, &basic, &quality, &consistency)
        };

        info!(
            samples = basic.samples_collected,
            is_complete,
            completion_confidence,
            registration_score,
            "completion analysis finished"
        );

        CompletionAnalysis {
            is_complete,
            completion_confidence,
            registration_score,
            basic,
            quality,
            consistency,
            recommendations,
        }
    }

    /// Whether a freshly computed analysis warrants persisting a status
    /// change: the complete/incomplete status flipped, or the set is now
    /// complete with sufficient confidence and not yet confirmed.
    /// No side effects; the caller decides what to persist.
    pub fn should_trigger_update(
        &self,
        analysis: &CompletionAnalysis,
        recorded: &RecordedStatus,
    ) -> bool {
        if recorded.complete != analysis.is_complete {
            debug!(
                old = recorded.complete,
                new = analysis.is_complete,
                "completion status change detected"
            );
            return true;
        }

        analysis.is_complete
            && analysis.completion_confidence >= self.criteria.completion_confidence_threshold
            && !recorded.confirmed
    }

    fn check_basic(&self, samples: &[StoredSample]) -> BasicCompletion {
        let collected = samples.len();
        let required = self.criteria.required_samples;

        BasicCompletion {
            samples_collected: collected,
            samples_required: required,
            samples_remaining: required.saturating_sub(collected),
            has_minimum_samples: collected >= required,
            completion_percentage: (collected as f32 / required as f32 * 100.0).min(100.0),
        }
    }

    fn check_quality(&self, samples: &[StoredSample]) -> QualityCompletion {
        if samples.is_empty() {
            return QualityCompletion {
                has_quality_samples: false,
                quality_samples_count: 0,
                average_quality: 0.0,
                min_quality_met: false,
                distribution: None,
            };
        }

        let qualities: Vec<f32> = samples.iter().map(|s| s.quality).collect();
        let average = qualities.iter().sum::<f32>() / qualities.len() as f32;
        let above_floor = samples
            .iter()
            .filter(|s| s.is_high_quality(self.criteria.min_quality_score))
            .count();

        QualityCompletion {
            has_quality_samples: above_floor >= self.criteria.required_samples,
            quality_samples_count: above_floor,
            average_quality: average,
            min_quality_met: average >= self.criteria.min_average_quality,
            distribution: Some(self.quality_distribution(&qualities)),
        }
    }

    fn quality_distribution(&self, qualities: &[f32]) -> QualityDistribution {
        let mut sorted = qualities.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        QualityDistribution {
            min_score: min,
            max_score: max,
            median_score: sorted[sorted.len() / 2],
            score_range: max - min,
            above_threshold_count: qualities
                .iter()
                .filter(|&&q| q >= self.criteria.min_quality_score)
                .count(),
        }
    }

    fn check_consistency(&self, samples: &[StoredSample]) -> ConsistencyCompletion {
        if samples.len() < 2 {
            return ConsistencyCompletion {
                is_consistent: false,
                consistency_score: 0.0,
                quality_stddev: 0.0,
                trend: QualityTrend::InsufficientData,
            };
        }

        let qualities: Vec<f32> = samples.iter().map(|s| s.quality).collect();
        let mean = qualities.iter().sum::<f32>() / qualities.len() as f32;
        let variance = qualities
            .iter()
            .map(|q| (q - mean) * (q - mean))
            .sum::<f32>()
            / qualities.len() as f32;
        let stddev = variance.sqrt();

        let threshold = self.criteria.quality_consistency_threshold;
        ConsistencyCompletion {
            is_consistent: stddev <= threshold,
            consistency_score: (1.0 - stddev / threshold).clamp(0.0, 1.0),
            quality_stddev: stddev,
            trend: quality_trend(&qualities),
        }
    }

    fn final_decision(
        &self,
        basic: &BasicCompletion,
        quality: &QualityCompletion,
        consistency: &ConsistencyCompletion,
    ) -> (bool, f32) {
        if !basic.has_minimum_samples {
            return (false, 0.0);
        }

        // Base credit for the minimum count, quality credit (full only
        // when both quality checks hold), consistency credit.
        let mut confidence = 0.4;
        if quality.has_quality_samples && quality.min_quality_met {
            confidence += 0.4;
        } else if quality.has_quality_samples || quality.min_quality_met {
            confidence += 0.2;
        }
        if consistency.is_consistent {
            confidence += 0.2;
        } else {
            confidence += consistency.consistency_score * 0.2;
        }
        let confidence = confidence.min(1.0);

        let is_complete = if self.criteria.allow_quality_override {
            basic.has_minimum_samples
        } else {
            basic.has_minimum_samples
                && quality.has_quality_samples
                && quality.min_quality_met
                && confidence >= self.criteria.completion_confidence_threshold
        };

        (is_complete, confidence)
    }

    fn registration_score(
        &self,
        basic: &BasicCompletion,
        quality: &QualityCompletion,
        consistency: &ConsistencyCompletion,
    ) -> f32 {
        let sample_score = (basic.completion_percentage / 100.0).min(1.0) * 0.25;
        let quality_score = quality.average_quality * 0.5;
        let consistency_score = consistency.consistency_score * 0.25;

        (sample_score + quality_score + consistency_score).min(1.0)
    }

    fn recommendations(
        &self,
        confidence: f32,
        basic: &BasicCompletion,
        quality: &QualityCompletion,
        consistency: &ConsistencyCompletion,
    ) -> Vec<String> {
        let mut recs = Vec::new();

        if !basic.has_minimum_samples {
            recs.push(format!(
                "Record {} more voice sample(s) to meet the minimum requirement",
                basic.samples_remaining
            ));
        }

        if !quality.min_quality_met {
            recs.push(format!(
                "Improve audio quality: current average {:.2}, target {:.2}",
                quality.average_quality, self.criteria.min_average_quality
            ));
        }

        if quality.quality_samples_count < self.criteria.required_samples {
            recs.push(format!(
                "Re-record {} sample(s) with better audio quality",
                self.criteria.required_samples - quality.quality_samples_count
            ));
        }

        if !consistency.is_consistent && basic.samples_collected >= 2 {
            recs.push(format!(
                "Improve consistency: quality variance {:.3} exceeds threshold {:.3}",
                consistency.quality_stddev, self.criteria.quality_consistency_threshold
            ));
        }

        if confidence < self.criteria.completion_confidence_threshold {
            recs.push(
                "Overall completion confidence needs improvement, consider re-recording samples"
                    .to_string(),
            );
        }

        recs
    }
}

impl Default for CompletionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies the quality direction by comparing first-half and
/// second-half means; a difference above 0.05 labels the trend.
fn quality_trend(qualities: &[f32]) -> QualityTrend {
    if qualities.len() < 2 {
        return QualityTrend::InsufficientData;
    }

    let mid = qualities.len() / 2;
    let first: f32 = qualities[..mid].iter().sum::<f32>() / mid as f32;
    let second: f32 = qualities[mid..].iter().sum::<f32>() / (qualities.len() - mid) as f32;

    if second > first + 0.05 {
        QualityTrend::Improving
    } else if first > second + 0.05 {
        QualityTrend::Declining
    } else {
        QualityTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use voicekey_sample::Embedding;

    use super::*;

    fn sample(quality: f32) -> StoredSample {
        StoredSample::new(
            Embedding::new(vec![0.1, 0.2, 0.3]).unwrap(),
            quality,
            HashMap::new(),
        )
        .unwrap()
    }

    fn samples(qualities: &[f32]) -> Vec<StoredSample> {
        qualities.iter().map(|&q| sample(q)).collect()
    }

    #[test]
    fn test_empty_set_incomplete() {
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&[]);

        assert!(!analysis.is_complete);
        assert_eq!(analysis.completion_confidence, 0.0);
        assert_eq!(analysis.samples_remaining(), 3);
        assert_eq!(analysis.basic.completion_percentage, 0.0);
        assert!(!analysis.recommendations.is_empty());
    }

    #[test]
    fn test_three_uniform_high_quality_samples_complete() {
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&samples(&[0.9, 0.9, 0.9]));

        assert!(analysis.is_complete);
        assert!(analysis.completion_confidence >= 0.85);
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.consistency.trend, QualityTrend::Stable);
    }

    #[test]
    fn test_idempotent() {
        let analyzer = CompletionAnalyzer::new();
        let set = samples(&[0.9, 0.8, 0.85, 0.7]);
        assert_eq!(analyzer.analyze(&set), analyzer.analyze(&set));
    }

    #[test]
    fn test_high_variance_flags_consistency() {
        // 4 of 5 samples pass the 0.7 floor, but the outlier drags the
        // average under 0.75 and the variance over the threshold.
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&samples(&[0.9, 0.85, 0.2, 0.9, 0.88]));

        assert!(analysis.quality.has_quality_samples);
        assert!(!analysis.quality.min_quality_met);
        assert!(!analysis.consistency.is_consistent);
        assert!(!analysis.is_complete);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("consistency")));
    }

    #[test]
    fn test_below_minimum_confidence_zero() {
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&samples(&[0.9, 0.9]));

        assert!(!analysis.is_complete);
        assert_eq!(analysis.completion_confidence, 0.0);
        assert_eq!(analysis.samples_remaining(), 1);
        assert!(analysis.recommendations[0].contains("1 more"));
    }

    #[test]
    fn test_quality_override_completes_on_count_alone() {
        let criteria = CompletionCriteria::default().with_quality_override(true);
        let analyzer = CompletionAnalyzer::with_criteria(criteria);
        // Low quality would normally block completion.
        let analysis = analyzer.analyze(&samples(&[0.5, 0.5, 0.5]));

        assert!(analysis.is_complete);
    }

    #[test]
    fn test_partial_quality_credit() {
        // Average above target but too few samples over the per-sample
        // floor: half quality credit only.
        let criteria = CompletionCriteria::default().with_required_samples(4);
        let analyzer = CompletionAnalyzer::with_criteria(criteria);
        let analysis = analyzer.analyze(&samples(&[0.95, 0.95, 0.95, 0.65]));

        assert!(analysis.quality.min_quality_met);
        assert!(!analysis.quality.has_quality_samples);
        assert!(!analysis.is_complete);
        assert!(analysis.completion_confidence < 0.85);
    }

    #[test]
    fn test_completion_percentage_capped() {
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&samples(&[0.9, 0.9, 0.9, 0.9, 0.9]));
        assert_eq!(analysis.basic.completion_percentage, 100.0);
        assert_eq!(analysis.samples_remaining(), 0);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(quality_trend(&[0.5, 0.6, 0.8, 0.9]), QualityTrend::Improving);
        assert_eq!(quality_trend(&[0.9, 0.8, 0.6, 0.5]), QualityTrend::Declining);
        assert_eq!(quality_trend(&[0.8, 0.8, 0.8]), QualityTrend::Stable);
        assert_eq!(quality_trend(&[0.8]), QualityTrend::InsufficientData);
    }

    #[test]
    fn test_quality_distribution() {
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&samples(&[0.9, 0.6, 0.8]));
        let dist = analysis.quality.distribution.unwrap();

        assert_eq!(dist.min_score, 0.6);
        assert_eq!(dist.max_score, 0.9);
        assert_eq!(dist.median_score, 0.8);
        assert!((dist.score_range - 0.3).abs() < 1e-6);
        assert_eq!(dist.above_threshold_count, 2);
    }

    #[test]
    fn test_registration_score_weighting() {
        let analyzer = CompletionAnalyzer::new();
        let analysis = analyzer.analyze(&samples(&[0.9, 0.9, 0.9]));
        // 0.25 * 1.0 + 0.5 * 0.9 + 0.25 * 1.0
        assert!((analysis.registration_score - 0.95).abs() < 1e-3);
    }

    #[test]
    fn test_should_trigger_update_on_status_flip() {
        let analyzer = CompletionAnalyzer::new();
        let complete = analyzer.analyze(&samples(&[0.9, 0.9, 0.9]));
        let incomplete = analyzer.analyze(&samples(&[0.9]));

        let recorded_incomplete = RecordedStatus::default();
        let recorded_complete = RecordedStatus {
            complete: true,
            confirmed: true,
        };

        assert!(analyzer.should_trigger_update(&complete, &recorded_incomplete));
        assert!(analyzer.should_trigger_update(&incomplete, &recorded_complete));
        assert!(!analyzer.should_trigger_update(&incomplete, &recorded_incomplete));
    }

    #[test]
    fn test_should_trigger_update_on_unconfirmed_completion() {
        let analyzer = CompletionAnalyzer::new();
        let complete = analyzer.analyze(&samples(&[0.9, 0.9, 0.9]));

        let unconfirmed = RecordedStatus {
            complete: true,
            confirmed: false,
        };
        let confirmed = RecordedStatus {
            complete: true,
            confirmed: true,
        };

        assert!(analyzer.should_trigger_update(&complete, &unconfirmed));
        assert!(!analyzer.should_trigger_update(&complete, &confirmed));
    }
}
