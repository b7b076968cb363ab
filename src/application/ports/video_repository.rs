use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Transcription, Video, VideoId};

/// Owns Video rows and the 1:1 transcription each may carry.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: &Video) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: VideoId) -> Result<Option<Video>, RepositoryError>;

    /// Insert-or-replace: re-transcribing a video overwrites its previous
    /// prompt and transcript.
    async fn upsert_transcription(
        &self,
        transcription: &Transcription,
    ) -> Result<(), RepositoryError>;

    async fn get_transcription(
        &self,
        video_id: VideoId,
    ) -> Result<Option<Transcription>, RepositoryError>;
}
