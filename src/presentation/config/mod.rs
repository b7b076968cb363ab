mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, ServerSettings, Settings, SettingsError, StorageSettings, SttSettings,
};
