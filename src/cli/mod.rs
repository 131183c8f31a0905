//! Command line entry points
//!
//! - `serve`: run the HTTP API (default)
//! - `migrate`: apply PostgreSQL schema migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Hackathon team registration API
#[derive(Parser)]
#[command(name = "hackathon-teams")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Apply PostgreSQL migrations and exit
    Migrate(MigrateArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(long, short)]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Database URL; defaults to `storage.database_url`
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Load `.env` and the layered configuration, then install logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    config
}
