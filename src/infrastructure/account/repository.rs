//! In-memory account repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, AccountField, AccountId, AccountRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    /// username -> account ID
    usernames: HashMap<String, AccountId>,
    /// email -> account ID
    emails: HashMap<String, AccountId>,
}

impl Tables {
    fn insert(&mut self, account: Account) {
        self.usernames
            .insert(account.username().to_string(), *account.id());
        self.emails.insert(account.email().to_string(), *account.id());
        self.accounts.insert(*account.id(), account);
    }

    /// Whether `value` in `index` belongs to an account other than `id`
    fn taken_by_other(index: &HashMap<String, AccountId>, value: &str, id: &AccountId) -> bool {
        index.get(value).is_some_and(|owner| owner != id)
    }

    fn check_unique(&self, account: &Account) -> Result<(), DomainError> {
        let mut taken = Vec::new();
        if Self::taken_by_other(&self.usernames, account.username(), account.id()) {
            taken.push(AccountField::Username);
        }
        if Self::taken_by_other(&self.emails, account.email(), account.id()) {
            taken.push(AccountField::Email);
        }

        if taken.is_empty() {
            Ok(())
        } else {
            Err(DomainError::duplicate_fields(taken))
        }
    }
}

/// In-memory implementation of AccountRepository
///
/// All tables sit behind one lock so each write is atomic.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryAccountRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial accounts
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let mut tables = Tables::default();

        for account in accounts {
            tables.insert(account);
        }

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.get(id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .usernames
            .get(&username.to_lowercase())
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .emails
            .get(&email.to_lowercase())
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.accounts.contains_key(account.id()) {
            return Err(DomainError::storage(format!(
                "Account with ID '{}' already exists",
                account.id()
            )));
        }

        tables.check_unique(&account)?;
        tables.insert(account.clone());

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let mut tables = self.tables.write().await;

        let (old_username, old_email) = match tables.accounts.get(account.id()) {
            Some(old) => (old.username().to_string(), old.email().to_string()),
            None => {
                return Err(DomainError::not_found(format!(
                    "Account '{}' not found",
                    account.id()
                )));
            }
        };

        tables.check_unique(account)?;

        if old_username != account.username() {
            tables.usernames.remove(&old_username);
        }
        if old_email != account.email() {
            tables.emails.remove(&old_email);
        }

        tables.insert(account.clone());

        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.accounts.remove(id) {
            Some(account) => {
                tables.usernames.remove(account.username());
                tables.emails.remove(account.email());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.tables.read().await.accounts.len())
    }
}
