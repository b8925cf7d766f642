//! Migrate command - applies or reverts PostgreSQL migrations

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::{init_logging, LoggingConfig};
use crate::infrastructure::storage::{Migrator, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

/// Apply every pending migration (or revert the latest) and report the resulting version
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format,
    });

    let pool = crate::connect_postgres(&config).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        match migrator.revert().await? {
            Some(reverted) => {
                let version = migrator.version().await?;
                info!(reverted, version = ?version, "Migration reverted");
            }
            None => info!("No applied migrations to revert"),
        }
        return Ok(());
    }

    let applied = migrator.run().await?;
    let version = migrator.version().await?;

    if applied.is_empty() {
        info!(version = ?version, "Schema already up to date");
    } else {
        info!(versions = ?applied, version = ?version, "Migrations applied");
    }

    Ok(())
}
