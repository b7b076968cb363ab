mod sqlite_pool;
mod sqlite_prompt_repository;
mod sqlite_video_repository;

pub use sqlite_pool::{connect, migrate};
pub use sqlite_prompt_repository::SqlitePromptRepository;
pub use sqlite_video_repository::SqliteVideoRepository;
