use std::collections::BTreeMap;

use thiserror::Error;

use super::account::{AccountField, ValidationErrors};

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("{} already taken", describe_taken(.fields))]
    DuplicateField { fields: Vec<AccountField> },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn duplicate_field(field: AccountField) -> Self {
        Self::DuplicateField {
            fields: vec![field],
        }
    }

    /// Every field in `fields` collided with another account
    pub fn duplicate_fields(mut fields: Vec<AccountField>) -> Self {
        fields.sort();
        fields.dedup();
        Self::DuplicateField { fields }
    }

    /// Fields reported as already taken, empty for other errors
    pub fn taken_fields(&self) -> &[AccountField] {
        match self {
            Self::DuplicateField { fields } => fields,
            _ => &[],
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Per-field messages for errors the caller can show next to a form field
    ///
    /// Returns `None` for errors that are not attributable to a field.
    pub fn field_errors(&self) -> Option<BTreeMap<String, Vec<String>>> {
        match self {
            Self::Validation(errors) => Some(errors.to_field_map()),
            Self::DuplicateField { fields } => Some(
                fields
                    .iter()
                    .map(|field| (field.to_string(), vec!["is already taken".to_string()]))
                    .collect(),
            ),
            _ => None,
        }
    }
}

fn describe_taken(fields: &[AccountField]) -> String {
    let names: Vec<&str> = fields.iter().map(AccountField::as_str).collect();
    match names.len() {
        1 => format!("{} is", names[0]),
        _ => format!("{} are", names.join(" and ")),
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
