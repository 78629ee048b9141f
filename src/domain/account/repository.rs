//! Account repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

/// Repository trait for account storage
///
/// Implementations enforce username and email uniqueness and report a
/// violation as [`DomainError::DuplicateField`]. Lookups by username or
/// email are case-insensitive.
#[async_trait]
pub trait AccountRepository: Send + Sync + Debug {
    /// Get an account by its ID
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Get an account by its username
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, DomainError>;

    /// Get an account by its email (for login)
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Create a new account
    async fn create(&self, account: Account) -> Result<Account, DomainError>;

    /// Save an existing account
    async fn update(&self, account: &Account) -> Result<Account, DomainError>;

    /// Delete an account
    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError>;

    /// Count accounts
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if a username is taken
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    /// Check if an email is taken
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
