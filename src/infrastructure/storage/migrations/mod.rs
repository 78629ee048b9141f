//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// PostgreSQL migrator that records applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies a single migration. Returns false if it was already applied.
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to start migration: {}", e)))?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, description = migration.description, "Applied migration");
        Ok(true)
    }

    /// Reverts a single migration. Returns false if it was not applied.
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to start revert: {}", e)))?;

        sqlx::raw_sql(migration.down)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit revert: {}", e)))?;

        info!(version = migration.version, "Reverted migration");
        Ok(true)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// Represents a database migration
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Migration version, ascending
    pub version: i64,
    /// Human-readable description
    pub description: &'static str,
    /// SQL to run when applying the migration
    pub up: &'static str,
    /// SQL to run when reverting the migration
    pub down: &'static str,
}

/// Schema for the accounts table
pub fn account_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Create accounts table",
        up: r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY,
                username VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                bio TEXT,
                image TEXT,
                password_salt TEXT,
                password_hash TEXT,
                favorites UUID[] NOT NULL DEFAULT '{}',
                following UUID[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT accounts_username_key UNIQUE (username),
                CONSTRAINT accounts_email_key UNIQUE (email)
            );
            CREATE INDEX IF NOT EXISTS idx_accounts_following ON accounts USING GIN (following);
            "#,
        down: r#"
            DROP TABLE IF EXISTS accounts;
            "#,
    }]
}

/// Applies every pending account migration, returning how many ran
pub async fn run_account_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in account_migrations() {
        if migrator.run_migration(&migration).await? {
            applied += 1;
        }
    }

    Ok(applied)
}

/// Reverts the most recently applied account migration, if any
pub async fn revert_last_account_migration(pool: &PgPool) -> Result<Option<i64>, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    let Some(current) = migrator.current_version().await? else {
        return Ok(None);
    };

    let migration = account_migrations()
        .into_iter()
        .find(|m| m.version == current)
        .ok_or_else(|| {
            DomainError::storage(format!("Applied migration {} is unknown", current))
        })?;

    migrator.revert_migration(&migration).await?;
    Ok(Some(current))
}
