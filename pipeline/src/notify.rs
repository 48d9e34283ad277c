use serde::{Deserialize, Serialize};
use voicekey_enroll::QualityTrend;

/// Enrollment events emitted through the [`Notifier`] port.
///
/// Exactly one is emitted per successful pipeline run: completion when
/// the analysis newly completes, a quality warning when enrollment is
/// in progress with low average quality, a progress event otherwise.
///
/// [`Notifier`]: crate::ports::Notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Notification {
    SampleRecorded {
        user_id: String,
        total_samples: usize,
        required_samples: usize,
        samples_remaining: usize,
        completion_percentage: f32,
    },
    QualityWarning {
        user_id: String,
        average_quality: f32,
        samples_collected: usize,
        quality_trend: QualityTrend,
    },
    RegistrationCompleted {
        user_id: String,
        completion_confidence: f32,
        registration_score: f32,
        total_samples: usize,
    },
}

impl Notification {
    pub fn user_id(&self) -> &str {
        match self {
            Self::SampleRecorded { user_id, .. }
            | Self::QualityWarning { user_id, .. }
            | Self::RegistrationCompleted { user_id, .. } => user_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SampleRecorded { .. } => "sample_recorded",
            Self::QualityWarning { .. } => "quality_warning",
            Self::RegistrationCompleted { .. } => "registration_completed",
        }
    }
}
