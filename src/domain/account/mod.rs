//! Account domain
//!
//! This module provides domain types and traits for member accounts,
//! including the account entity, field validation, password and token
//! seams, API payloads, and the repository trait.

mod entity;
mod password;
mod payload;
mod repository;
mod token;
mod validation;

pub use entity::{Account, AccountId, AccountParts, ArticleId};
pub use password::{PasswordCredential, PasswordHasher};
pub use payload::{AuthPayload, ProfilePayload, DEFAULT_IMAGE_URL};
pub use repository::AccountRepository;
pub use token::{AuthClaims, TokenIssuer};
pub use validation::{
    validate_email, validate_password, validate_registration, validate_username, AccountField,
    AccountValidationError, ValidationErrors,
};

#[cfg(test)]
pub use repository::mock::MockAccountRepository;
#[cfg(test)]
pub use token::MockTokenIssuer;
