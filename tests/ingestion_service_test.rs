use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use sqlx::{Row, SqlitePool};

use clipscribe::application::ports::VideoRepository;
use clipscribe::application::services::{IngestError, IngestionService};
use clipscribe::domain::StorageName;
use clipscribe::infrastructure::persistence::{self, SqliteVideoRepository};
use clipscribe::infrastructure::storage::LocalMediaStore;

struct Fixture {
    service: IngestionService<LocalMediaStore>,
    pool: SqlitePool,
    _upload_dir: tempfile::TempDir,
}

async fn create_fixture() -> Fixture {
    let pool = persistence::connect("sqlite::memory:").await.unwrap();
    persistence::migrate(&pool).await.unwrap();

    let video_repository: Arc<dyn VideoRepository> =
        Arc::new(SqliteVideoRepository::new(pool.clone()));
    let upload_dir = tempfile::TempDir::new().unwrap();
    let media_store = Arc::new(LocalMediaStore::new(upload_dir.path().to_path_buf()).unwrap());

    Fixture {
        service: IngestionService::new(media_store, video_repository),
        pool,
        _upload_dir: upload_dir,
    }
}

async fn video_count(pool: &SqlitePool) -> i64 {
    sqlx::query("SELECT COUNT(*) AS count FROM videos")
        .fetch_one(pool)
        .await
        .unwrap()
        .try_get("count")
        .unwrap()
}

#[tokio::test]
async fn given_valid_stream_when_ingesting_then_video_points_at_written_file() {
    let fixture = create_fixture().await;

    let chunks = vec![Ok(Bytes::from("ID3 ")), Ok(Bytes::from("audio payload"))];
    let video = fixture
        .service
        .ingest("talk.mp3", Box::pin(stream::iter(chunks)))
        .await
        .unwrap();

    assert_eq!(video.name, "talk.mp3");
    let written = std::fs::read(&video.path).unwrap();
    assert_eq!(written, b"ID3 audio payload");
    assert_eq!(video_count(&fixture.pool).await, 1);
}

#[tokio::test]
async fn given_disallowed_extension_when_ingesting_then_no_record_is_created() {
    let fixture = create_fixture().await;

    let chunks = vec![Ok(Bytes::from("RIFF"))];
    let result = fixture
        .service
        .ingest("talk.wav", Box::pin(stream::iter(chunks)))
        .await;

    assert!(matches!(result, Err(IngestError::InvalidExtension)));
    assert_eq!(video_count(&fixture.pool).await, 0);
}

#[tokio::test]
async fn given_stream_error_when_ingesting_then_error_propagates_and_no_record_is_created() {
    let fixture = create_fixture().await;

    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection truncated",
        )),
    ];
    let result = fixture
        .service
        .ingest("talk.mp3", Box::pin(stream::iter(chunks)))
        .await;

    assert!(matches!(result, Err(IngestError::Stream(_))));
    assert_eq!(video_count(&fixture.pool).await, 0);
}

#[test]
fn given_identical_filenames_when_generating_storage_names_then_names_are_distinct() {
    let first = StorageName::generate("talk.mp3");
    let second = StorageName::generate("talk.mp3");

    assert_ne!(first, second);
    assert!(first.as_str().starts_with("talk-"));
    assert!(first.as_str().ends_with(".mp3"));
    assert!(second.as_str().starts_with("talk-"));
    assert!(second.as_str().ends_with(".mp3"));
}
