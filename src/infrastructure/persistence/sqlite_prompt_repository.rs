use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::application::ports::{PromptRepository, RepositoryError};
use crate::domain::{Prompt, PromptId};

pub struct SqlitePromptRepository {
    pool: SqlitePool,
}

impl SqlitePromptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromptRepository for SqlitePromptRepository {
    async fn list(&self) -> Result<Vec<Prompt>, RepositoryError> {
        let rows = sqlx::query("SELECT id, title, template FROM prompts ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|r| {
                let id: String = r
                    .try_get("id")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let title: String = r
                    .try_get("title")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let template: String = r
                    .try_get("template")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

                let id = Uuid::parse_str(&id)
                    .map(PromptId::from_uuid)
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

                Ok(Prompt {
                    id,
                    title,
                    template,
                })
            })
            .collect()
    }
}
