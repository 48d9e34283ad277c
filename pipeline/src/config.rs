use std::time::Duration;

/// Configuration for [`Pipeline`](crate::Pipeline).
///
/// Immutable after load; shared read-only across concurrent runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Object-key prefix that scopes upload events to this pipeline.
    pub trigger_prefix: String,
    /// Default whole-pipeline retry count for
    /// [`process_with_retry`](crate::Pipeline::process_with_retry).
    pub max_retries: u32,
    /// Per-collaborator-call timeout. A timeout is a stage failure.
    pub collaborator_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trigger_prefix: "audio-uploads/".to_string(),
            max_retries: 3,
            collaborator_timeout: Duration::from_secs(180),
        }
    }
}

impl PipelineConfig {
    /// Reads configuration from `VOICEKEY_PIPELINE_*` environment
    /// variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        let timeout_secs = std::env::var("VOICEKEY_PIPELINE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(d.collaborator_timeout.as_secs());
        Self {
            trigger_prefix: std::env::var("VOICEKEY_PIPELINE_TRIGGER_PREFIX")
                .unwrap_or(d.trigger_prefix),
            max_retries: std::env::var("VOICEKEY_PIPELINE_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.max_retries),
            collaborator_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_trigger_prefix(mut self, prefix: &str) -> Self {
        self.trigger_prefix = prefix.to_string();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_collaborator_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout = timeout;
        self
    }
}
