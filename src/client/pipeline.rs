use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{TranscodeError, Transcoder};
use crate::client::status::{InvalidTransition, StatusMachine, UploadStatus};
use crate::client::upload_client::{TranscriptionResult, UploadClient, UploadError, UploadedVideo};

#[derive(Debug, Clone)]
pub struct VideoFile {
    pub name: String,
    pub bytes: Bytes,
}

/// Optional per-stage deadlines; `None` leaves a stage unbounded.
#[derive(Debug, Clone, Default)]
pub struct StageDeadlines {
    pub transcode: Option<Duration>,
    pub upload: Option<Duration>,
    pub transcribe: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub video: UploadedVideo,
    pub transcription: TranscriptionResult,
}

/// Drives one submission through transcode, upload, and transcription. The
/// stages run strictly in sequence; the status machine refuses a second
/// submission while one is in flight, and every stage error lands the
/// machine in `Failed` instead of stranding it mid-phase.
pub struct UploadPipeline<T: Transcoder> {
    transcoder: Arc<T>,
    upload_client: UploadClient,
    deadlines: StageDeadlines,
    cancel: CancellationToken,
    machine: StatusMachine,
    selected: Mutex<Option<VideoFile>>,
}

impl<T: Transcoder> UploadPipeline<T> {
    pub fn new(
        transcoder: Arc<T>,
        upload_client: UploadClient,
        deadlines: StageDeadlines,
    ) -> (Self, mpsc::UnboundedReceiver<UploadStatus>) {
        let (machine, events) = StatusMachine::new();
        (
            Self {
                transcoder,
                upload_client,
                deadlines,
                cancel: CancellationToken::new(),
                machine,
                selected: Mutex::new(None),
            },
            events,
        )
    }

    pub fn status(&self) -> UploadStatus {
        self.machine.current()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stage a file for the next submission. Refused while a run is in
    /// flight; returns whether the selection was accepted.
    pub fn select_file(&self, file: VideoFile) -> bool {
        if !self.machine.current().accepts_input() {
            return false;
        }
        *self.selected.lock().unwrap() = Some(file);
        true
    }

    /// Run the full pipeline. A no-op (`Ok(None)`) when no file is selected,
    /// the prompt is empty, or a run is already in flight.
    pub async fn submit(&self, prompt: &str) -> Result<Option<SubmissionResult>, PipelineError> {
        let file = {
            let selected = self.selected.lock().unwrap();
            match selected.as_ref() {
                Some(file) if !prompt.trim().is_empty() => file.clone(),
                _ => return Ok(None),
            }
        };

        // The waiting -> converting edge doubles as the in-flight guard:
        // a second submission loses the transition and becomes a no-op.
        if self.machine.advance(UploadStatus::Converting).is_err() {
            return Ok(None);
        }
        tracing::debug!(file = %file.name, "Convert started");

        let progress: &(dyn Fn(f32) + Send + Sync) = &|fraction: f32| {
            tracing::debug!(progress = (fraction * 100.0).round(), "Convert progress");
        };

        let artifact = match self
            .run_stage(
                "transcode",
                self.deadlines.transcode,
                self.transcoder.extract_audio(&file.bytes, progress),
            )
            .await
        {
            Ok(artifact) => artifact,
            Err(e) => return self.fail(e),
        };

        self.machine.advance(UploadStatus::Uploading)?;

        let video = match self
            .run_stage(
                "upload",
                self.deadlines.upload,
                self.upload_client.upload(&artifact),
            )
            .await
        {
            Ok(video) => video,
            Err(e) => return self.fail(e),
        };

        self.machine.advance(UploadStatus::Generating)?;
        tracing::debug!(video_id = %video.id, "Transcription started");

        let transcription = match self
            .run_stage(
                "transcribe",
                self.deadlines.transcribe,
                self.upload_client.request_transcription(&video.id, prompt),
            )
            .await
        {
            Ok(transcription) => transcription,
            Err(e) => return self.fail(e),
        };

        self.machine.advance(UploadStatus::Success)?;
        tracing::info!(video_id = %video.id, "Submission finished");

        Ok(Some(SubmissionResult {
            video,
            transcription,
        }))
    }

    async fn run_stage<F, O, E>(
        &self,
        stage: &'static str,
        deadline: Option<Duration>,
        fut: F,
    ) -> Result<O, PipelineError>
    where
        F: Future<Output = Result<O, E>>,
        PipelineError: From<E>,
    {
        let work = async {
            match deadline {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| PipelineError::Timeout {
                        stage,
                        after: limit,
                    })?
                    .map_err(PipelineError::from),
                None => fut.await.map_err(PipelineError::from),
            }
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(PipelineError::Cancelled { stage }),
            result = work => result,
        }
    }

    fn fail<O>(&self, error: PipelineError) -> Result<O, PipelineError> {
        tracing::warn!(error = %error, "Submission failed");
        let _ = self.machine.advance(UploadStatus::Failed {
            reason: error.to_string(),
        });
        Err(error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("transcode: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("upload: {0}")]
    Upload(#[from] UploadError),
    #[error("stage {stage} timed out after {after:?}")]
    Timeout {
        stage: &'static str,
        after: Duration,
    },
    #[error("submission cancelled during {stage}")]
    Cancelled { stage: &'static str },
    #[error("status machine: {0}")]
    Status(#[from] InvalidTransition),
}
