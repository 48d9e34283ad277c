//! In-memory collaborator implementations.
//!
//! Intended for testing and small-scale use; production deployments
//! implement the ports against real object and table storage.

use std::collections::HashMap;
use std::sync::Mutex;

use voicekey_enroll::RecordedStatus;
use voicekey_sample::StoredSample;

use crate::error::{RepoError, StoreError};
use crate::ports::{AudioMetadata, AudioStore, FetchedAudio, SampleRepository, StatusUpdate};

// ---------------------------------------------------------------------------
// MemoryRepository
// ---------------------------------------------------------------------------

#[derive(Default)]
struct UserRecord {
    samples: Vec<StoredSample>,
    status: RecordedStatus,
}

/// In-memory [`SampleRepository`].
///
/// The append happens entirely under one lock hold, so concurrent
/// appends for the same user serialize and each caller observes a
/// distinct authoritative count, matching the atomic-append contract.
pub struct MemoryRepository {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a user with an empty sample set.
    pub fn add_user(&self, user_id: &str) {
        let mut users = self.users.lock().unwrap();
        users.entry(user_id.to_string()).or_default();
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SampleRepository for MemoryRepository {
    async fn get_samples(&self, user_id: &str) -> Result<Vec<StoredSample>, RepoError> {
        let users = self.users.lock().unwrap();
        users
            .get(user_id)
            .map(|u| u.samples.clone())
            .ok_or_else(|| RepoError::UserNotFound(user_id.to_string()))
    }

    async fn append_sample(
        &self,
        user_id: &str,
        sample: StoredSample,
    ) -> Result<usize, RepoError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| RepoError::UserNotFound(user_id.to_string()))?;
        user.samples.push(sample);
        Ok(user.samples.len())
    }

    async fn get_status(&self, user_id: &str) -> Result<RecordedStatus, RepoError> {
        let users = self.users.lock().unwrap();
        users
            .get(user_id)
            .map(|u| u.status)
            .ok_or_else(|| RepoError::UserNotFound(user_id.to_string()))
    }

    async fn set_status(&self, user_id: &str, update: StatusUpdate) -> Result<(), RepoError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| RepoError::UserNotFound(user_id.to_string()))?;
        user.status = RecordedStatus {
            complete: update.registration_complete,
            // A persisted completion carries its confidence, so treat it
            // as confirmed from then on.
            confirmed: update.registration_complete,
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryAudioStore
// ---------------------------------------------------------------------------

/// In-memory [`AudioStore`] keyed by object key.
pub struct MemoryAudioStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    max_object_size: u64,
}

impl MemoryAudioStore {
    pub fn new() -> Self {
        Self::with_max_object_size(10 * 1024 * 1024)
    }

    pub fn with_max_object_size(max_object_size: u64) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            max_object_size,
        }
    }

    pub fn put(&self, key: &str, bytes: Vec<u8>) {
        let mut objects = self.objects.lock().unwrap();
        objects.insert(key.to_string(), bytes);
    }
}

impl Default for MemoryAudioStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AudioStore for MemoryAudioStore {
    async fn fetch(&self, key: &str) -> Result<FetchedAudio, StoreError> {
        let objects = self.objects.lock().unwrap();
        let bytes = objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        if bytes.len() as u64 > self.max_object_size {
            return Err(StoreError::TooLarge {
                size: bytes.len() as u64,
                max: self.max_object_size,
            });
        }

        let file_name = key.rsplit('/').next().unwrap_or(key).to_string();
        let size_bytes = bytes.len() as u64;
        Ok(FetchedAudio {
            bytes,
            metadata: AudioMetadata {
                file_name,
                content_type: "audio/wav".to_string(),
                size_bytes,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as StdHashMap;

    use voicekey_sample::Embedding;

    use super::*;

    fn sample() -> StoredSample {
        StoredSample::new(
            Embedding::new(vec![0.1, 0.2]).unwrap(),
            0.9,
            StdHashMap::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_append_returns_authoritative_count() {
        let repo = MemoryRepository::new();
        repo.add_user("u1");

        assert_eq!(repo.append_sample("u1", sample()).await.unwrap(), 1);
        assert_eq!(repo.append_sample("u1", sample()).await.unwrap(), 2);
        assert_eq!(repo.get_samples("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let repo = MemoryRepository::new();
        assert!(matches!(
            repo.append_sample("nobody", sample()).await,
            Err(RepoError::UserNotFound(_))
        ));
        assert!(repo.get_samples("nobody").await.is_err());
    }

    #[tokio::test]
    async fn test_status_roundtrip() {
        let repo = MemoryRepository::new();
        repo.add_user("u1");

        let status = repo.get_status("u1").await.unwrap();
        assert!(!status.complete);

        repo.set_status(
            "u1",
            StatusUpdate {
                registration_complete: true,
                completion_confidence: 0.9,
                completed_at: None,
            },
        )
        .await
        .unwrap();

        let status = repo.get_status("u1").await.unwrap();
        assert!(status.complete);
        assert!(status.confirmed);
    }

    #[tokio::test]
    async fn test_store_fetch() {
        let store = MemoryAudioStore::new();
        store.put("audio-uploads/u1/sample.wav", vec![1, 2, 3]);

        let audio = store.fetch("audio-uploads/u1/sample.wav").await.unwrap();
        assert_eq!(audio.bytes, vec![1, 2, 3]);
        assert_eq!(audio.metadata.file_name, "sample.wav");

        assert!(matches!(
            store.fetch("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_size_limit() {
        let store = MemoryAudioStore::with_max_object_size(2);
        store.put("k", vec![1, 2, 3]);
        assert!(matches!(
            store.fetch("k").await,
            Err(StoreError::TooLarge { size: 3, max: 2 })
        ));
    }
}
