use std::sync::Arc;

use tokio::net::TcpListener;

use clipscribe::application::ports::VideoRepository;
use clipscribe::application::services::{IngestionService, TranscriptionService};
use clipscribe::infrastructure::observability::{init_tracing, TracingConfig};
use clipscribe::infrastructure::persistence::{self, SqlitePromptRepository, SqliteVideoRepository};
use clipscribe::infrastructure::storage::LocalMediaStore;
use clipscribe::infrastructure::stt::WhisperApiEngine;
use clipscribe::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(TracingConfig::default(), settings.server.port);

    let pool = persistence::connect(&settings.database.url).await?;
    persistence::migrate(&pool).await?;

    let video_repository: Arc<dyn VideoRepository> =
        Arc::new(SqliteVideoRepository::new(pool.clone()));
    let prompt_repository = Arc::new(SqlitePromptRepository::new(pool));
    let media_store = Arc::new(LocalMediaStore::new(settings.storage.upload_dir.clone())?);
    let speech_to_text = Arc::new(WhisperApiEngine::new(
        reqwest::Client::new(),
        settings.stt.api_key.clone(),
        settings.stt.base_url.clone(),
        Some(settings.stt.model.clone()),
        settings.stt.language.clone(),
    ));

    let ingestion_service = Arc::new(IngestionService::new(
        Arc::clone(&media_store),
        Arc::clone(&video_repository),
    ));
    let transcription_service = Arc::new(TranscriptionService::new(
        speech_to_text,
        Arc::clone(&media_store),
        Arc::clone(&video_repository),
    ));

    let state = AppState {
        ingestion_service,
        transcription_service,
        prompt_repository,
    };

    let router = create_router(state);

    let listener =
        TcpListener::bind((settings.server.host.as_str(), settings.server.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
