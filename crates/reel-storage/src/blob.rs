//! Blob store capability.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Durable key/value blob store holding rendered videos.
///
/// Writes to an existing key overwrite it; the last write wins.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket or container the store writes to.
    fn bucket(&self) -> &str;

    /// Upload a local file as a single blob.
    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()>;

    /// Upload bytes as a single blob.
    async fn upload_bytes(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()>;

    /// Fetch a whole blob into memory.
    async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>>;
}

/// A blob held by [`MemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-process blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    bucket: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Read a stored object with its metadata.
    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", path.display(), e)))?;
        self.upload_bytes(data, key, content_type).await
    }

    async fn upload_bytes(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
        debug!("Storing {} bytes under {}/{}", data.len(), self.bucket, key);

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::not_found(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_keeps_content_type() {
        let store = MemoryBlobStore::new("videos");
        store
            .upload_bytes(b"mp4".to_vec(), "2025-06-15.mp4", "video/mp4")
            .await
            .unwrap();

        assert_eq!(store.download_bytes("2025-06-15.mp4").await.unwrap(), b"mp4");
        assert_eq!(store.get("2025-06-15.mp4").await.unwrap().content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let store = MemoryBlobStore::new("videos");
        let err = store.download_bytes("2025-06-15.mp4").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_same_key_last_write_wins() {
        let store = MemoryBlobStore::new("videos");
        store.upload_bytes(b"first".to_vec(), "k.mp4", "video/mp4").await.unwrap();
        store.upload_bytes(b"second".to_vec(), "k.mp4", "video/mp4").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.download_bytes("k.mp4").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_upload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        tokio::fs::write(&path, b"rendered").await.unwrap();

        let store = MemoryBlobStore::new("videos");
        store.upload_file(&path, "out.mp4", "video/mp4").await.unwrap();
        assert_eq!(store.download_bytes("out.mp4").await.unwrap(), b"rendered");
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails() {
        let store = MemoryBlobStore::new("videos");
        let err = store
            .upload_file(Path::new("/nonexistent/out.mp4"), "out.mp4", "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
        assert!(store.is_empty().await);
    }
}
