//! Conduit Accounts
//!
//! The account model behind a Conduit-style blogging backend, with support for:
//! - Registration with unique, validated usernames and emails
//! - Salted PBKDF2 password credentials
//! - Signed, time-bounded JWT authentication tokens
//! - Following accounts and favoriting articles
//! - In-memory and PostgreSQL account stores

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::DomainError;
use infrastructure::{
    account::{AccountService, InMemoryAccountRepository, Pbkdf2Hasher, PostgresAccountRepository},
    auth::{JwtConfig, JwtService},
    storage,
};
use tracing::info;

/// Account service backed by PostgreSQL
pub type PostgresAccountService =
    AccountService<PostgresAccountRepository, Pbkdf2Hasher, JwtService>;

/// Account service backed by process memory
pub type InMemoryAccountService =
    AccountService<InMemoryAccountRepository, Pbkdf2Hasher, JwtService>;

/// Build the token issuer from configuration
///
/// A missing signing secret is a startup failure, never a per-request one.
pub fn create_token_issuer(config: &AppConfig) -> Result<JwtService, DomainError> {
    let jwt_config = JwtConfig::from_settings(&config.auth)?;
    let service = JwtService::new(jwt_config)?;

    info!(
        expiration_days = service.expiration_days(),
        "Token issuer configured"
    );
    Ok(service)
}

/// Create the account service against PostgreSQL
pub async fn create_account_service(config: &AppConfig) -> anyhow::Result<PostgresAccountService> {
    let tokens = create_token_issuer(config)?;
    let pool = storage::connect(&config.database).await?;

    Ok(AccountService::new(
        Arc::new(PostgresAccountRepository::new(pool)),
        Arc::new(Pbkdf2Hasher::new()),
        Arc::new(tokens),
    ))
}

/// Create an account service that keeps everything in memory
pub fn create_in_memory_account_service(
    config: &AppConfig,
) -> Result<InMemoryAccountService, DomainError> {
    let tokens = create_token_issuer(config)?;

    Ok(AccountService::new(
        Arc::new(InMemoryAccountRepository::new()),
        Arc::new(Pbkdf2Hasher::new()),
        Arc::new(tokens),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure::account::RegisterRequest;

    fn config_with_secret(secret: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret = secret.map(str::to_string);
        config
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = create_in_memory_account_service(&config_with_secret(None));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));

        let blank = create_in_memory_account_service(&config_with_secret(Some("")));
        assert!(matches!(blank, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_service_round_trip() {
        let service = create_in_memory_account_service(&config_with_secret(Some("s3cret"))).unwrap();

        let account = service
            .register(RegisterRequest {
                username: "alice".to_string(),
                email: "a@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let payload = service.auth_payload(&account).unwrap();
        let resolved = service.authenticate_token(&payload.token).await.unwrap();
        assert_eq!(resolved.username(), "alice");
    }
}
