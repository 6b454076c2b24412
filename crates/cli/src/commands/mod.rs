//! CLI subcommands.

pub mod admin;
pub mod db;

use marketmate_admin::config::{ConfigError, MongoConfig};
use marketmate_admin::db::{MongoStore, RepositoryError};
use thiserror::Error;

/// Errors shared by every command that talks to the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] RepositoryError),
}

/// Connect to the configured database.
pub async fn connect() -> Result<MongoStore, ConnectError> {
    let config = MongoConfig::from_env()?;
    tracing::info!(database = %config.database, "Connecting to MongoDB...");
    Ok(MongoStore::connect(&config).await?)
}
