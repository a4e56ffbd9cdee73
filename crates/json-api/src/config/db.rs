//! Database Config

use clap::Args;

/// Order ledger database.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string; migrations run against it on startup
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}
