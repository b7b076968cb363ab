mod ingestion_service;
mod transcription_service;

pub use ingestion_service::{
    IngestError, IngestionService, ALLOWED_EXTENSION, INVALID_TYPE_MESSAGE, MAX_UPLOAD_BYTES,
    MISSING_FILE_MESSAGE,
};
pub use transcription_service::{TranscribeError, TranscriptionService};
