use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One audio-upload event from the object store, as delivered by the
/// (excluded) trigger layer.
///
/// Keys follow the addressing scheme
/// `<trigger_prefix><user_id>/<file_name>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEvent {
    pub bucket: String,
    pub key: String,
    #[serde(default)]
    pub size_bytes: u64,
}

impl UploadEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size_bytes,
        }
    }

    /// Derives the owning user id from the event key.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidEvent`] when the key does not start with
    /// the trigger prefix or the user segment is empty.
    pub fn user_id(&self, trigger_prefix: &str) -> Result<String, PipelineError> {
        let rest = self.key.strip_prefix(trigger_prefix).ok_or_else(|| {
            PipelineError::InvalidEvent(format!(
                "key {:?} does not start with trigger prefix {:?}",
                self.key, trigger_prefix
            ))
        })?;

        let user_id = rest.split('/').next().unwrap_or("");
        if user_id.is_empty() {
            return Err(PipelineError::InvalidEvent(format!(
                "could not extract user id from key {:?}",
                self.key
            )));
        }

        Ok(user_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "audio-uploads/";

    #[test]
    fn test_user_id_extraction() {
        let event = UploadEvent::new("bucket", "audio-uploads/user-42/sample_1.wav", 1024);
        assert_eq!(event.user_id(PREFIX).unwrap(), "user-42");
    }

    #[test]
    fn test_missing_prefix() {
        let event = UploadEvent::new("bucket", "other/user-42/sample_1.wav", 1024);
        assert!(event.user_id(PREFIX).is_err());
    }

    #[test]
    fn test_empty_user_segment() {
        let event = UploadEvent::new("bucket", "audio-uploads/", 1024);
        assert!(event.user_id(PREFIX).is_err());

        let event = UploadEvent::new("bucket", "audio-uploads//sample.wav", 1024);
        assert!(event.user_id(PREFIX).is_err());
    }

    #[test]
    fn test_key_without_file_segment() {
        // A bare user directory still yields the user id.
        let event = UploadEvent::new("bucket", "audio-uploads/user-42", 0);
        assert_eq!(event.user_id(PREFIX).unwrap(), "user-42");
    }
}
