use std::io;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::application::ports::{MediaStore, MediaStoreError, RepositoryError, VideoRepository};
use crate::domain::{StorageName, Video};

/// Hard ceiling on an upload body, enforced at the route boundary.
pub const MAX_UPLOAD_BYTES: usize = 1_048_576 * 25;

/// Extension match is byte-exact; `.MP3` is rejected.
pub const ALLOWED_EXTENSION: &str = "mp3";

pub const MISSING_FILE_MESSAGE: &str = "Missing file input.";
pub const INVALID_TYPE_MESSAGE: &str = "Invalid input type, please upload a MP3.";

pub struct IngestionService<M: MediaStore> {
    media_store: Arc<M>,
    video_repository: Arc<dyn VideoRepository>,
}

impl<M: MediaStore> IngestionService<M> {
    pub fn new(media_store: Arc<M>, video_repository: Arc<dyn VideoRepository>) -> Self {
        Self {
            media_store,
            video_repository,
        }
    }

    /// Validate the filename, pipe the payload to durable storage, and only
    /// after the write completes create the Video record.
    pub async fn ingest(
        &self,
        filename: &str,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<Video, IngestError> {
        if !has_allowed_extension(filename) {
            tracing::warn!(filename = %filename, "Rejected upload with disallowed extension");
            return Err(IngestError::InvalidExtension);
        }

        let storage_name = StorageName::generate(filename);
        let stored = self.media_store.store(&storage_name, stream).await?;

        let video = Video::new(filename.to_string(), stored.path);
        self.video_repository.create(&video).await?;

        tracing::info!(
            video_id = %video.id,
            filename = %filename,
            bytes = stored.size_bytes,
            "Audio upload ingested"
        );

        Ok(video)
    }
}

fn has_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == ALLOWED_EXTENSION)
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{}", INVALID_TYPE_MESSAGE)]
    InvalidExtension,
    #[error("storage: {0}")]
    Stream(#[from] MediaStoreError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
