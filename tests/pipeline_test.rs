use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sqlx::{Row, SqlitePool};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use clipscribe::application::ports::{
    ProgressFn, SpeechToText, SpeechToTextError, TranscodeError, Transcoder, VideoRepository,
};
use clipscribe::application::services::{IngestionService, TranscriptionService};
use clipscribe::client::{
    PipelineError, StageDeadlines, UploadClient, UploadPipeline, UploadStatus, VideoFile,
};
use clipscribe::domain::AudioArtifact;
use clipscribe::infrastructure::persistence::{
    self, SqlitePromptRepository, SqliteVideoRepository,
};
use clipscribe::infrastructure::storage::LocalMediaStore;
use clipscribe::presentation::{create_router, AppState};

struct FixedSpeechToText;

#[async_trait::async_trait]
impl SpeechToText for FixedSpeechToText {
    async fn transcribe(&self, _audio: &[u8], hint: &str) -> Result<String, SpeechToTextError> {
        Ok(format!("transcript biased by '{}'", hint))
    }
}

struct FakeTranscoder {
    fail_no_audio: bool,
    delay: Option<Duration>,
}

impl FakeTranscoder {
    fn ok() -> Self {
        Self {
            fail_no_audio: false,
            delay: None,
        }
    }

    fn without_audio_stream() -> Self {
        Self {
            fail_no_audio: true,
            delay: None,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            fail_no_audio: false,
            delay: Some(delay),
        }
    }
}

#[async_trait::async_trait]
impl Transcoder for FakeTranscoder {
    async fn extract_audio(
        &self,
        _video: &[u8],
        progress: ProgressFn<'_>,
    ) -> Result<AudioArtifact, TranscodeError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_no_audio {
            return Err(TranscodeError::NoAudioStream);
        }
        progress(0.5);
        progress(1.0);
        Ok(AudioArtifact::new(Bytes::from_static(
            b"ID3 compressed audio",
        )))
    }
}

struct TestServer {
    base_url: String,
    pool: SqlitePool,
    shutdown: Option<oneshot::Sender<()>>,
    _upload_dir: tempfile::TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn spawn_test_server() -> TestServer {
    let pool = persistence::connect("sqlite::memory:").await.unwrap();
    persistence::migrate(&pool).await.unwrap();

    let video_repository: Arc<dyn VideoRepository> =
        Arc::new(SqliteVideoRepository::new(pool.clone()));
    let prompt_repository = Arc::new(SqlitePromptRepository::new(pool.clone()));

    let upload_dir = tempfile::TempDir::new().unwrap();
    let media_store = Arc::new(LocalMediaStore::new(upload_dir.path().to_path_buf()).unwrap());

    let ingestion_service = Arc::new(IngestionService::new(
        Arc::clone(&media_store),
        Arc::clone(&video_repository),
    ));
    let transcription_service = Arc::new(TranscriptionService::new(
        Arc::new(FixedSpeechToText),
        Arc::clone(&media_store),
        Arc::clone(&video_repository),
    ));

    let state = AppState {
        ingestion_service,
        transcription_service,
        prompt_repository,
    };

    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        pool,
        shutdown: Some(shutdown_tx),
        _upload_dir: upload_dir,
    }
}

fn drain(events: &mut mpsc::UnboundedReceiver<UploadStatus>) -> Vec<&'static str> {
    let mut labels = Vec::new();
    while let Ok(status) = events.try_recv() {
        labels.push(status.label());
    }
    labels
}

async fn video_count(pool: &SqlitePool) -> i64 {
    sqlx::query("SELECT COUNT(*) AS count FROM videos")
        .fetch_one(pool)
        .await
        .unwrap()
        .try_get("count")
        .unwrap()
}

fn sample_video() -> VideoFile {
    VideoFile {
        name: "lecture.mp4".to_string(),
        bytes: Bytes::from_static(b"fake mp4 container"),
    }
}

#[tokio::test]
async fn given_valid_video_and_prompt_when_submitting_then_statuses_progress_to_success() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let (pipeline, mut events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::ok()),
        upload_client,
        StageDeadlines::default(),
    );

    assert!(pipeline.select_file(sample_video()));
    let result = pipeline
        .submit("keyword1,keyword2")
        .await
        .unwrap()
        .expect("submission should run");

    assert_eq!(
        drain(&mut events),
        vec!["converting", "uploading", "generating", "success"]
    );
    assert_eq!(result.video.id, result.transcription.video_id);
    assert_eq!(result.video.name, "audio.mp3");
    assert_eq!(
        result.transcription.transcript,
        "transcript biased by 'keyword1,keyword2'"
    );
    assert_eq!(pipeline.status(), UploadStatus::Success);
}

#[tokio::test]
async fn given_empty_prompt_when_submitting_then_submission_is_noop() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let (pipeline, mut events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::ok()),
        upload_client,
        StageDeadlines::default(),
    );

    pipeline.select_file(sample_video());
    let result = pipeline.submit("   ").await.unwrap();

    assert!(result.is_none());
    assert!(drain(&mut events).is_empty());
    assert_eq!(pipeline.status(), UploadStatus::Waiting);
}

#[tokio::test]
async fn given_no_selected_file_when_submitting_then_submission_is_noop() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let (pipeline, mut events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::ok()),
        upload_client,
        StageDeadlines::default(),
    );

    let result = pipeline.submit("keyword1").await.unwrap();

    assert!(result.is_none());
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn given_video_without_audio_stream_when_submitting_then_no_upload_is_attempted() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let (pipeline, mut events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::without_audio_stream()),
        upload_client,
        StageDeadlines::default(),
    );

    pipeline.select_file(sample_video());
    let error = pipeline.submit("keyword1").await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::Transcode(TranscodeError::NoAudioStream)
    ));
    assert_eq!(drain(&mut events), vec!["converting", "failed"]);
    assert!(matches!(pipeline.status(), UploadStatus::Failed { .. }));
    assert_eq!(video_count(&server.pool).await, 0);
}

#[tokio::test]
async fn given_transcode_deadline_when_stage_exceeds_it_then_submission_fails() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let deadlines = StageDeadlines {
        transcode: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let (pipeline, mut events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::slow(Duration::from_secs(30))),
        upload_client,
        deadlines,
    );

    pipeline.select_file(sample_video());
    let error = pipeline.submit("keyword1").await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::Timeout {
            stage: "transcode",
            ..
        }
    ));
    assert_eq!(drain(&mut events), vec!["converting", "failed"]);
}

#[tokio::test]
async fn given_cancelled_token_when_submitting_then_submission_fails_as_cancelled() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let (pipeline, mut events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::slow(Duration::from_secs(30))),
        upload_client,
        StageDeadlines::default(),
    );

    pipeline.cancellation_token().cancel();
    pipeline.select_file(sample_video());
    let error = pipeline.submit("keyword1").await.unwrap_err();

    assert!(matches!(error, PipelineError::Cancelled { .. }));
    assert_eq!(drain(&mut events), vec!["converting", "failed"]);
}

#[tokio::test]
async fn given_finished_pipeline_when_submitting_again_then_submission_is_noop() {
    let server = spawn_test_server().await;

    let upload_client = UploadClient::new(reqwest::Client::new(), &server.base_url);
    let (pipeline, _events) = UploadPipeline::new(
        Arc::new(FakeTranscoder::ok()),
        upload_client,
        StageDeadlines::default(),
    );

    pipeline.select_file(sample_video());
    pipeline.submit("keyword1").await.unwrap();

    assert!(!pipeline.select_file(sample_video()));
    let second = pipeline.submit("keyword1").await.unwrap();
    assert!(second.is_none());
    assert_eq!(video_count(&server.pool).await, 1);
}
