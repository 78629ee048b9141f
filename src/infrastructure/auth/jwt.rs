//! JWT token generation and validation

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt::Debug;

use crate::config::AuthConfig;
use crate::domain::account::{Account, AuthClaims, TokenIssuer};
use crate::domain::DomainError;

/// Token lifetime when none is configured
pub const DEFAULT_EXPIRATION_DAYS: u32 = 60;

/// Configuration for JWT service
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in days
    pub expiration_days: u32,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("expiration_days", &self.expiration_days)
            .finish()
    }
}

impl JwtConfig {
    /// Create new JWT configuration
    pub fn new(secret: impl Into<String>, expiration_days: u32) -> Self {
        Self {
            secret: secret.into(),
            expiration_days,
        }
    }

    /// Build from application settings, failing when no secret is configured
    pub fn from_settings(settings: &AuthConfig) -> Result<Self, DomainError> {
        let secret = settings
            .secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("auth.secret must be set to sign tokens")
            })?;

        Ok(Self::new(secret, settings.token_expiration_days))
    }
}

/// HMAC-SHA256 token issuer using a shared secret
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Result<Self, DomainError> {
        if config.secret.trim().is_empty() {
            return Err(DomainError::configuration("JWT secret cannot be empty"));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    pub fn expiration_days(&self) -> u32 {
        self.config.expiration_days
    }
}

impl TokenIssuer for JwtService {
    fn issue(&self, account: &Account) -> Result<String, DomainError> {
        let claims = AuthClaims::new(account, self.config.expiration_days)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, DomainError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<AuthClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| DomainError::credential(format!("Invalid JWT: {}", e)))?;

        Ok(token_data.claims)
    }
}
