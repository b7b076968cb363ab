use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::Prompt;

#[async_trait]
pub trait PromptRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Prompt>, RepositoryError>;
}
