//! MySQL connection used by the importer and the menu SQL runner

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::debug;

/// Connect to `database_url`
///
/// Both callers run statements one after another, so a small pool is enough.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the server cannot be reached.
pub async fn connect(database_url: &str) -> Result<MySqlPool> {
    debug!("connecting to database");
    MySqlPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("Failed to connect to the database. Check the database URL")
}
