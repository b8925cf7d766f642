//! Grant-role command - identity administration
//!
//! The only way a user becomes an admin. Works against the configured
//! storage backend, so it is only meaningful with PostgreSQL.

use clap::Args;
use tracing::{info, warn};

use crate::config::{AppConfig, StorageBackend};
use crate::domain::Role;
use crate::infrastructure::logging::{init_logging, LoggingConfig};

#[derive(Debug, Args)]
pub struct GrantRoleArgs {
    /// Email of the account to update
    #[arg(long)]
    pub email: String,

    /// Role to grant: `user` or `admin`
    #[arg(long, value_parser = parse_role)]
    pub role: Role,
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("unknown role '{}', expected user or admin", value))
}

pub async fn run(args: GrantRoleArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format,
    });

    if config.storage.backend == StorageBackend::Memory {
        warn!("In-memory storage selected; the role change will not outlive this process");
    }

    let state = crate::create_app_state_with_config(&config).await?;
    let user = state.identity.grant_role(&args.email, args.role).await?;

    info!(user_id = %user.id(), email = %user.email(), role = %user.role(), "Role updated");
    Ok(())
}
