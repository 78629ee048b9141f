//! Password credential material and the hashing seam

use std::fmt::{self, Debug};

use crate::domain::DomainError;

/// Salt and derived hash for one password, both hex encoded
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    salt: String,
    hash: String,
}

impl PasswordCredential {
    pub fn new(salt: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            hash: hash.into(),
        }
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("salt", &"[hidden]")
            .field("hash", &"[hidden]")
            .finish()
    }
}

/// Trait for password hashing operations
///
/// Implementations must derive with the same parameters on every call,
/// otherwise previously stored credentials stop verifying.
pub trait PasswordHasher: Send + Sync + Debug {
    /// Derive a credential from a plaintext password using a fresh salt
    fn hash(&self, password: &str) -> Result<PasswordCredential, DomainError>;

    /// Check a plaintext password against a stored credential
    fn verify(&self, password: &str, credential: &PasswordCredential) -> bool;
}
