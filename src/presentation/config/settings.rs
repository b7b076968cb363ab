use std::path::PathBuf;

use super::Environment;

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub stt: SttSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SttSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub language: Option<String>,
}

impl Settings {
    /// Assemble settings from the process environment. Only the provider
    /// API key has no default.
    pub fn from_env() -> Result<Self, SettingsError> {
        let environment = std::env::var("APP_ENV")
            .unwrap_or_else(|_| "local".to_string())
            .try_into()
            .map_err(SettingsError::InvalidEnvironment)?;

        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| SettingsError::InvalidPort(raw.clone()))?,
            Err(_) => 3333,
        };

        Ok(Self {
            environment,
            server: ServerSettings {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            database: DatabaseSettings {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:clipscribe.db?mode=rwc".to_string()),
            },
            storage: StorageSettings {
                upload_dir: std::env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("tmp")),
            },
            stt: SttSettings {
                api_key: std::env::var("OPENAI_API_KEY")
                    .map_err(|_| SettingsError::MissingApiKey)?,
                base_url: std::env::var("STT_BASE_URL").ok(),
                model: std::env::var("STT_MODEL").unwrap_or_else(|_| "whisper-1".to_string()),
                language: std::env::var("STT_LANGUAGE").ok(),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0}")]
    InvalidEnvironment(String),
    #[error("invalid SERVER_PORT: {0}")]
    InvalidPort(String),
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}
