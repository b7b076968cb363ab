use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StorageName;

/// Location and size of a fully written storage object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub size_bytes: u64,
}

#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Pipe the stream to durable storage under `name`, respecting
    /// backpressure. Resolves only after the write fully completes.
    async fn store(
        &self,
        name: &StorageName,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<StoredObject, MediaStoreError>;

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, MediaStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
