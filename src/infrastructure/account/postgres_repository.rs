//! PostgreSQL account repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::account::{
    Account, AccountField, AccountId, AccountParts, AccountRepository, ArticleId,
    PasswordCredential,
};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, username, email, bio, image, password_salt, password_hash,
           favorites, following, created_at, updated_at
    FROM accounts
"#;

/// PostgreSQL implementation of AccountRepository
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Account>, DomainError> {
        let sql = format!("{} WHERE {} = $1", SELECT_COLUMNS, predicate);

        let row = sqlx::query(&sql)
            .bind(value.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to get account by {}: {}", predicate, e))
            })?;

        row.as_ref().map(row_to_account).transpose()
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, DomainError> {
        self.fetch_one_where("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        self.fetch_one_where("email", email).await
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let credential = account.credential();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, bio, image, password_salt, password_hash,
                                  favorites, following, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.username())
        .bind(account.email())
        .bind(account.bio())
        .bind(account.image())
        .bind(credential.map(|c| c.salt()))
        .bind(credential.map(|c| c.hash()))
        .bind(favorite_uuids(&account))
        .bind(following_uuids(&account))
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "create"))?;

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let credential = account.credential();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET username = $2, email = $3, bio = $4, image = $5, password_salt = $6,
                password_hash = $7, favorites = $8, following = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.username())
        .bind(account.email())
        .bind(account.bio())
        .bind(account.image())
        .bind(credential.map(|c| c.salt()))
        .bind(credential.map(|c| c.hash()))
        .bind(favorite_uuids(account))
        .bind(following_uuids(account))
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete account: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count accounts: {}", e)))?;

        Ok(count as usize)
    }
}

fn favorite_uuids(account: &Account) -> Vec<Uuid> {
    account.favorites().iter().map(|id| *id.as_uuid()).collect()
}

fn following_uuids(account: &Account) -> Vec<Uuid> {
    account.following().iter().map(|id| *id.as_uuid()).collect()
}

/// Which account field a unique constraint protects
fn constraint_field(constraint: &str) -> Option<AccountField> {
    if constraint.contains("username") {
        Some(AccountField::Username)
    } else if constraint.contains("email") {
        Some(AccountField::Email)
    } else {
        None
    }
}

fn map_write_error(error: sqlx::Error, action: &str) -> DomainError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            if let Some(field) = db_error.constraint().and_then(constraint_field) {
                return DomainError::duplicate_field(field);
            }
        }
    }

    DomainError::storage(format!("Failed to {} account: {}", action, error))
}

fn row_to_account(row: &PgRow) -> Result<Account, DomainError> {
    let column_error =
        |e: sqlx::Error| DomainError::storage(format!("Invalid account row: {}", e));

    let id: Uuid = row.try_get("id").map_err(column_error)?;
    let salt: Option<String> = row.try_get("password_salt").map_err(column_error)?;
    let hash: Option<String> = row.try_get("password_hash").map_err(column_error)?;
    let favorites: Vec<Uuid> = row.try_get("favorites").map_err(column_error)?;
    let following: Vec<Uuid> = row.try_get("following").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(column_error)?;

    let credential = match (salt, hash) {
        (Some(salt), Some(hash)) => Some(PasswordCredential::new(salt, hash)),
        _ => None,
    };

    Ok(Account::restore(AccountParts {
        id: AccountId::from_uuid(id),
        username: row.try_get("username").map_err(column_error)?,
        email: row.try_get("email").map_err(column_error)?,
        bio: row.try_get("bio").map_err(column_error)?,
        image: row.try_get("image").map_err(column_error)?,
        credential,
        favorites: favorites.into_iter().map(ArticleId::from_uuid).collect(),
        following: following.into_iter().map(AccountId::from_uuid).collect(),
        created_at,
        updated_at,
    }))
}
