use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where users and registrations live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    #[default]
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_expiration_hours")]
    pub jwt_expiration_hours: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Set the `Secure` attribute on the session cookie
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// Idle seconds before an unfinished registration draft is dropped
    #[serde(default = "default_draft_ttl_secs")]
    pub draft_ttl_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_expiration_hours() -> u64 {
    24
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_draft_ttl_secs() -> u64 {
    1800
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: default_expiration_hours(),
            cookie_name: default_cookie_name(),
            secure_cookie: false,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            draft_ttl_secs: default_draft_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Layer `config/default`, `config/local` and `APP__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            app_config.storage.database_url = Some(url);
        }

        Ok(app_config)
    }
}
