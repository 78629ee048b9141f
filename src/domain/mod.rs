//! Domain layer - Core business logic and entities

pub mod account;
pub mod error;

pub use account::{
    Account, AccountField, AccountId, AccountRepository, ArticleId, AuthClaims, AuthPayload,
    PasswordCredential, PasswordHasher, ProfilePayload, TokenIssuer, ValidationErrors,
};
pub use error::DomainError;
