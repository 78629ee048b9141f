//! Password hashing using PBKDF2-HMAC-SHA512

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use crate::domain::account::{PasswordCredential, PasswordHasher};
use crate::domain::DomainError;

/// Random salt length in bytes (hex encoded before use)
pub const SALT_LENGTH: usize = 16;
/// PBKDF2 iteration count
pub const ITERATIONS: u32 = 1000;
/// Derived key length in bytes
pub const HASH_LENGTH: usize = 512;

/// PBKDF2-based password hasher
///
/// The parameters are fixed: changing any of them makes every stored
/// credential unverifiable. The salt fed to PBKDF2 is the hex text of the
/// random bytes, not the raw bytes, so existing records keep verifying.
#[derive(Debug, Clone, Default)]
pub struct Pbkdf2Hasher;

impl Pbkdf2Hasher {
    /// Create a new PBKDF2 hasher
    pub fn new() -> Self {
        Self
    }

    fn generate_salt() -> Result<String, DomainError> {
        let mut bytes = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DomainError::internal(format!("Entropy source unavailable: {}", e)))?;

        Ok(hex::encode(bytes))
    }

    fn derive(password: &str, salt: &str) -> Result<String, DomainError> {
        let mut output = vec![0u8; HASH_LENGTH];

        pbkdf2::<Hmac<Sha512>>(password.as_bytes(), salt.as_bytes(), ITERATIONS, &mut output)
            .map_err(|e| DomainError::internal(format!("Failed to derive password hash: {}", e)))?;

        Ok(hex::encode(output))
    }
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordCredential, DomainError> {
        let salt = Self::generate_salt()?;
        let hash = Self::derive(password, &salt)?;

        Ok(PasswordCredential::new(salt, hash))
    }

    fn verify(&self, password: &str, credential: &PasswordCredential) -> bool {
        match Self::derive(password, credential.salt()) {
            Ok(hash) => hash.as_bytes().ct_eq(credential.hash().as_bytes()).into(),
            Err(_) => false,
        }
    }
}
