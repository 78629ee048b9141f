//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Seconds to wait for a pooled connection before giving up
const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Open a connection pool using the configured (or `DATABASE_URL`) address
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let url = config.resolve_url().ok_or_else(|| {
        DomainError::configuration("database.url or DATABASE_URL must be set")
    })?;

    info!(max_connections = config.max_connections, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect(&url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!("PostgreSQL connection established");
    Ok(pool)
}
