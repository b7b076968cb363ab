mod pipeline;
mod status;
mod upload_client;

pub use pipeline::{PipelineError, StageDeadlines, SubmissionResult, UploadPipeline, VideoFile};
pub use status::{InvalidTransition, StatusMachine, UploadStatus};
pub use upload_client::{TranscriptionResult, UploadClient, UploadError, UploadedVideo};
