mod media_store;
mod prompt_repository;
mod repository_error;
mod speech_to_text;
mod transcoder;
mod video_repository;

pub use media_store::{MediaStore, MediaStoreError, StoredObject};
pub use prompt_repository::PromptRepository;
pub use repository_error::RepositoryError;
pub use speech_to_text::{SpeechToText, SpeechToTextError};
pub use transcoder::{ProgressFn, TranscodeError, Transcoder};
pub use video_repository::VideoRepository;
