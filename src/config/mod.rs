//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, FormConfig, LogFormat, LoggingConfig, ServerConfig, StorageBackend,
    StorageSettings,
};
