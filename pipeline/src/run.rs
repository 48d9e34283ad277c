use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voicekey_enroll::CompletionAnalysis;

use crate::error::PipelineError;
use crate::event::UploadEvent;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One discrete, independently observable step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ExtractIdentity,
    FetchAndValidate,
    GenerateEmbedding,
    PersistSample,
    ReevaluateCompletion,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtractIdentity => f.write_str("extract_identity"),
            Self::FetchAndValidate => f.write_str("fetch_and_validate"),
            Self::GenerateEmbedding => f.write_str("generate_embedding"),
            Self::PersistSample => f.write_str("persist_sample"),
            Self::ReevaluateCompletion => f.write_str("reevaluate_completion"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Success,
    Failed,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Outcome of one executed stage. Retained for observability; not
/// authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Stage-specific detail on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Error description on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// PipelineRun
// ---------------------------------------------------------------------------

/// Record of one processed sample event. Ephemeral; one per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub bucket: String,
    pub key: String,
    /// Set once stage 1 succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub success: bool,
    /// Executed stages in order; stages after a failure are absent.
    pub stages: Vec<StageRecord>,
    /// Authoritative post-append sample count from the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
    /// Final completion analysis when stage 5 ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionAnalysis>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
}

impl PipelineRun {
    pub(crate) fn start(event: &UploadEvent) -> Self {
        Self {
            bucket: event.bucket.clone(),
            key: event.key.clone(),
            user_id: None,
            success: false,
            stages: Vec::with_capacity(5),
            sample_count: None,
            completion: None,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: 0,
        }
    }

    pub(crate) fn record_success(
        &mut self,
        stage: Stage,
        started_at: DateTime<Utc>,
        detail: Option<String>,
    ) {
        self.stages.push(StageRecord {
            stage,
            status: StageStatus::Success,
            started_at,
            finished_at: Utc::now(),
            detail,
            error: None,
        });
    }

    pub(crate) fn record_failure(
        &mut self,
        stage: Stage,
        started_at: DateTime<Utc>,
        error: &PipelineError,
    ) {
        self.stages.push(StageRecord {
            stage,
            status: StageStatus::Failed,
            started_at,
            finished_at: Utc::now(),
            detail: None,
            error: Some(error.to_string()),
        });
    }

    pub(crate) fn finish(&mut self, success: bool) {
        let now = Utc::now();
        self.success = success;
        self.duration_ms = (now - self.started_at).num_milliseconds().max(0) as u64;
        self.finished_at = Some(now);
    }

    /// The failing stage record, if the run failed.
    pub fn failed_stage(&self) -> Option<&StageRecord> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Failed)
    }

    /// Whether the given stage executed (successfully or not).
    pub fn stage_executed(&self, stage: Stage) -> bool {
        self.stages.iter().any(|s| s.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display() {
        assert_eq!(Stage::ExtractIdentity.to_string(), "extract_identity");
        assert_eq!(Stage::FetchAndValidate.to_string(), "fetch_and_validate");
        assert_eq!(Stage::GenerateEmbedding.to_string(), "generate_embedding");
        assert_eq!(Stage::PersistSample.to_string(), "persist_sample");
        assert_eq!(
            Stage::ReevaluateCompletion.to_string(),
            "reevaluate_completion"
        );
    }

    #[test]
    fn test_failed_stage_lookup() {
        let event = UploadEvent::new("b", "audio-uploads/u/s.wav", 10);
        let mut run = PipelineRun::start(&event);
        let t = Utc::now();
        run.record_success(Stage::ExtractIdentity, t, None);
        run.record_failure(
            Stage::FetchAndValidate,
            t,
            &PipelineError::InvalidEvent("x".to_string()),
        );
        run.finish(false);

        assert!(!run.success);
        let failed = run.failed_stage().unwrap();
        assert_eq!(failed.stage, Stage::FetchAndValidate);
        assert!(run.stage_executed(Stage::ExtractIdentity));
        assert!(!run.stage_executed(Stage::GenerateEmbedding));
    }
}
