use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::application::ports::{RepositoryError, VideoRepository};
use crate::domain::{Transcription, Video, VideoId};

pub struct SqliteVideoRepository {
    pool: SqlitePool,
}

impl SqliteVideoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for SqliteVideoRepository {
    #[instrument(skip(self, video), fields(video_id = %video.id))]
    async fn create(&self, video: &Video) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO videos (id, name, path, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(video.id.as_uuid().to_string())
            .bind(&video.name)
            .bind(&video.path)
            .bind(video.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn get_by_id(&self, id: VideoId) -> Result<Option<Video>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, path, created_at FROM videos WHERE id = ?1")
            .bind(id.as_uuid().to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(r) => {
                let id: String = r
                    .try_get("id")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let name: String = r
                    .try_get("name")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let path: String = r
                    .try_get("path")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let created_at: String = r
                    .try_get("created_at")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

                let id = VideoId::parse(&id)
                    .ok_or_else(|| RepositoryError::QueryFailed(format!("invalid id: {}", id)))?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

                Ok(Some(Video {
                    id,
                    name,
                    path,
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, transcription), fields(video_id = %transcription.video_id))]
    async fn upsert_transcription(
        &self,
        transcription: &Transcription,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO transcriptions (video_id, prompt, transcript) VALUES (?1, ?2, ?3)",
        )
        .bind(transcription.video_id.as_uuid().to_string())
        .bind(&transcription.prompt)
        .bind(&transcription.transcript)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn get_transcription(
        &self,
        video_id: VideoId,
    ) -> Result<Option<Transcription>, RepositoryError> {
        let row = sqlx::query(
            "SELECT video_id, prompt, transcript FROM transcriptions WHERE video_id = ?1",
        )
        .bind(video_id.as_uuid().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(r) => {
                let prompt: String = r
                    .try_get("prompt")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let transcript: String = r
                    .try_get("transcript")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

                Ok(Some(Transcription {
                    video_id,
                    prompt,
                    transcript,
                }))
            }
            None => Ok(None),
        }
    }
}
