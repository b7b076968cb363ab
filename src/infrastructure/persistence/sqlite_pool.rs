use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::domain::PromptId;

/// In-memory databases get a single connection so every query sees the same
/// database instance.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            path TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transcriptions (
            video_id TEXT PRIMARY KEY REFERENCES videos(id),
            prompt TEXT NOT NULL,
            transcript TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prompts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            template TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    seed_prompts(pool).await?;

    Ok(())
}

const SEED_PROMPTS: &[(&str, &str)] = &[
    (
        "YouTube title",
        "Generate a short, catchy YouTube title for the video below:\n\n'''\n{transcription}\n'''",
    ),
    (
        "YouTube description",
        "Generate a succinct YouTube description for the video below. Start with a short summary, then list the main topics as bullet points:\n\n'''\n{transcription}\n'''",
    ),
];

async fn seed_prompts(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM prompts")
        .fetch_one(pool)
        .await?;
    let count: i64 = row.try_get("count")?;
    if count > 0 {
        return Ok(());
    }

    for &(title, template) in SEED_PROMPTS {
        sqlx::query("INSERT INTO prompts (id, title, template) VALUES (?1, ?2, ?3)")
            .bind(PromptId::new().as_uuid().to_string())
            .bind(title)
            .bind(template)
            .execute(pool)
            .await?;
    }

    tracing::info!(count = SEED_PROMPTS.len(), "Seeded prompt templates");
    Ok(())
}
