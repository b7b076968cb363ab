use std::sync::Arc;

use crate::application::ports::{
    MediaStore, MediaStoreError, RepositoryError, SpeechToText, SpeechToTextError, VideoRepository,
};
use crate::domain::{Transcription, VideoId};

pub struct TranscriptionService<S, M>
where
    S: SpeechToText,
    M: MediaStore,
{
    speech_to_text: Arc<S>,
    media_store: Arc<M>,
    video_repository: Arc<dyn VideoRepository>,
}

impl<S, M> TranscriptionService<S, M>
where
    S: SpeechToText,
    M: MediaStore,
{
    pub fn new(
        speech_to_text: Arc<S>,
        media_store: Arc<M>,
        video_repository: Arc<dyn VideoRepository>,
    ) -> Self {
        Self {
            speech_to_text,
            media_store,
            video_repository,
        }
    }

    /// Resolve the video, load its stored audio, and run the external
    /// speech-to-text capability with `prompt` as recognition hint. The
    /// resulting transcript replaces any previous one for the video.
    pub async fn transcribe(
        &self,
        video_id: VideoId,
        prompt: &str,
    ) -> Result<Transcription, TranscribeError> {
        let video = self
            .video_repository
            .get_by_id(video_id)
            .await?
            .ok_or(TranscribeError::VideoNotFound(video_id))?;

        let audio = self.media_store.fetch(&video.path).await?;

        tracing::debug!(
            video_id = %video.id,
            bytes = audio.len(),
            "Sending stored audio to speech-to-text provider"
        );

        let transcript = self.speech_to_text.transcribe(&audio, prompt).await?;

        let transcription = Transcription::new(video.id, prompt.to_string(), transcript);
        self.video_repository
            .upsert_transcription(&transcription)
            .await?;

        tracing::info!(
            video_id = %video.id,
            chars = transcription.transcript.len(),
            "Transcription persisted"
        );

        Ok(transcription)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("video not found: {0}")]
    VideoNotFound(VideoId),
    #[error("storage: {0}")]
    Storage(#[from] MediaStoreError),
    #[error("provider: {0}")]
    Provider(#[from] SpeechToTextError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
