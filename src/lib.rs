//! Corporate Run Registration
//!
//! Registration and admin reporting service for a corporate running event:
//! - Session-aware access gate for protected pages
//! - Three-step registration form with a single atomic insert
//! - Admin report with company filter and CSV export

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::{AppState, IdentityServiceTrait, SessionCookie};
use crate::config::StorageBackend;
use domain::RegistrationRepository;
use infrastructure::{
    auth::{JwtConfig, JwtGenerator, JwtService},
    identity::{Argon2Hasher, IdentityService, InMemoryUserRepository, PostgresUserRepository},
    registration::{
        InMemoryRegistrationRepository, PostgresRegistrationRepository, RegistrationFormService,
        RegistrationService,
    },
    storage::{connect_pool, run_storage_migrations, PostgresConfig},
};
use sqlx::PgPool;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let tokens = create_jwt_service(config);
    let hasher = Arc::new(Argon2Hasher::new());

    info!("Storage backend: {:?}", config.storage.backend);

    let (identity, registrations): (
        Arc<dyn IdentityServiceTrait>,
        Arc<dyn RegistrationRepository>,
    ) = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = connect_postgres(config).await?;
            let applied = run_storage_migrations(&pool).await?;
            if !applied.is_empty() {
                info!(versions = ?applied, "Applied storage migrations");
            }

            (
                Arc::new(IdentityService::new(
                    Arc::new(PostgresUserRepository::new(pool.clone())),
                    hasher,
                    tokens,
                )),
                Arc::new(PostgresRegistrationRepository::new(pool)),
            )
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; accounts and registrations are lost on restart");
            (
                Arc::new(IdentityService::new(
                    Arc::new(InMemoryUserRepository::new()),
                    hasher,
                    tokens,
                )),
                Arc::new(InMemoryRegistrationRepository::new()),
            )
        }
    };

    Ok(build_state(config, identity, registrations))
}

/// Open the PostgreSQL pool described by the storage settings
pub async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PgPool> {
    let url = config
        .storage
        .database_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL or storage.database_url is required"))?;

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await?;

    Ok(pool)
}

fn build_state(
    config: &AppConfig,
    identity: Arc<dyn IdentityServiceTrait>,
    registrations: Arc<dyn RegistrationRepository>,
) -> AppState {
    AppState {
        identity,
        registrations: RegistrationService::new(registrations.clone()),
        registration_form: RegistrationFormService::new(
            registrations,
            Duration::from_secs(config.form.draft_ttl_secs),
        ),
        session_cookie: SessionCookie {
            name: config.auth.cookie_name.clone(),
            secure: config.auth.secure_cookie,
            max_age_secs: (config.auth.jwt_expiration_hours * 3600) as i64,
        },
    }
}

fn create_jwt_service(config: &AppConfig) -> Arc<dyn JwtGenerator> {
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default JWT secret; set APP__AUTH__JWT_SECRET in production");
    }

    Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    )))
}

/// In-memory state over the given registration store, for tests
#[cfg(test)]
pub fn create_test_state(registrations: Arc<dyn RegistrationRepository>) -> AppState {
    let config = AppConfig::default();
    let identity = Arc::new(IdentityService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(Argon2Hasher::new()),
        create_jwt_service(&config),
    ));

    build_state(&config, identity, registrations)
}
