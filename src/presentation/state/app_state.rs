use std::sync::Arc;

use crate::application::ports::{MediaStore, PromptRepository, SpeechToText};
use crate::application::services::{IngestionService, TranscriptionService};

pub struct AppState<S, M>
where
    S: SpeechToText,
    M: MediaStore,
{
    pub ingestion_service: Arc<IngestionService<M>>,
    pub transcription_service: Arc<TranscriptionService<S, M>>,
    pub prompt_repository: Arc<dyn PromptRepository>,
}

impl<S, M> Clone for AppState<S, M>
where
    S: SpeechToText,
    M: MediaStore,
{
    fn clone(&self) -> Self {
        Self {
            ingestion_service: Arc::clone(&self.ingestion_service),
            transcription_service: Arc::clone(&self.transcription_service),
            prompt_repository: Arc::clone(&self.prompt_repository),
        }
    }
}
