//! Account field validation

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// Deliberately loose: something, an `@`, something, a dot, something
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

/// Account fields that carry validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountField {
    Username,
    Email,
    Password,
}

impl AccountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation failure
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccountValidationError {
    #[error("{0} can't be blank")]
    Blank(AccountField),

    #[error("{0} is invalid")]
    Invalid(AccountField),
}

impl AccountValidationError {
    /// The field this error belongs to
    pub fn field(&self) -> AccountField {
        match self {
            Self::Blank(field) | Self::Invalid(field) => *field,
        }
    }

    /// The message without the field name, as shown next to a form field
    pub fn message(&self) -> &'static str {
        match self {
            Self::Blank(_) => "can't be blank",
            Self::Invalid(_) => "is invalid",
        }
    }
}

/// All validation failures collected for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<AccountValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: AccountValidationError) {
        self.0.push(error);
    }

    /// Record the outcome of a single field check
    pub fn check(&mut self, result: Result<(), AccountValidationError>) {
        if let Err(error) = result {
            self.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[AccountValidationError] {
        &self.0
    }

    /// Whether any error was recorded for the given field
    pub fn has_field(&self, field: AccountField) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    /// Group messages by field name
    pub fn to_field_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for error in &self.0 {
            map.entry(error.field().to_string())
                .or_default()
                .push(error.message().to_string());
        }

        map
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a username
///
/// Rules:
/// - Cannot be blank
/// - ASCII letters and digits only
pub fn validate_username(username: &str) -> Result<(), AccountValidationError> {
    if username.trim().is_empty() {
        return Err(AccountValidationError::Blank(AccountField::Username));
    }

    if !USERNAME_PATTERN.is_match(username) {
        return Err(AccountValidationError::Invalid(AccountField::Username));
    }

    Ok(())
}

/// Validate an email address
///
/// Rules:
/// - Cannot be blank
/// - Must contain `something@something.something`
pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    if email.trim().is_empty() {
        return Err(AccountValidationError::Blank(AccountField::Email));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(AccountValidationError::Invalid(AccountField::Email));
    }

    Ok(())
}

/// Validate a plaintext password. Only presence is required.
pub fn validate_password(password: &str) -> Result<(), AccountValidationError> {
    if password.is_empty() {
        return Err(AccountValidationError::Blank(AccountField::Password));
    }

    Ok(())
}

/// Validate every field of a registration at once
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_username(username));
    errors.check(validate_email(email));
    errors.check(validate_password(password));
    errors.into_result()
}
