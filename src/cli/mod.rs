//! CLI module for the registration service
//!
//! Subcommands:
//! - `serve`: HTTP server (default)
//! - `migrate`: apply (or `--revert` the latest) storage migrations and exit
//! - `grant-role`: set a user's role

pub mod grant_role;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Corporate run registration and admin reporting service
#[derive(Parser)]
#[command(name = "run-registration")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending storage migrations
    Migrate(migrate::MigrateArgs),

    /// Grant a role to an existing user
    GrantRole(grant_role::GrantRoleArgs),
}
