//! Authentication token claims and the issuing seam

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Claims carried by an authentication token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Account identifier
    pub id: AccountId,
    /// Username at the time of issuance
    pub username: String,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

impl AuthClaims {
    /// Claims for `account` that expire `expiration_days` calendar days after `now`
    pub fn new_at(
        account: &Account,
        now: DateTime<Utc>,
        expiration_days: u32,
    ) -> Result<Self, DomainError> {
        let expires_at = now
            .checked_add_days(Days::new(u64::from(expiration_days)))
            .ok_or_else(|| DomainError::internal("Token expiration is out of range"))?;

        Ok(Self {
            id: *account.id(),
            username: account.username().to_string(),
            exp: expires_at.timestamp(),
        })
    }

    /// Claims for `account` that expire `expiration_days` from now
    pub fn new(account: &Account, expiration_days: u32) -> Result<Self, DomainError> {
        Self::new_at(account, Utc::now(), expiration_days)
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn account_id(&self) -> &AccountId {
        &self.id
    }
}

/// Produces and checks signed, time-bounded credentials
#[cfg_attr(test, automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a signed token for an account
    fn issue(&self, account: &Account) -> Result<String, DomainError>;

    /// Verify a token's signature and expiry and return its claims
    fn verify(&self, token: &str) -> Result<AuthClaims, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn account() -> Account {
        Account::new("alice", "a@example.com")
    }

    #[test]
    fn test_expiry_is_calendar_days() {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let claims = AuthClaims::new_at(&account(), now, 60).unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(claims.exp, expected.timestamp());
    }

    #[test]
    fn test_claims_carry_identity() {
        let account = account();
        let claims = AuthClaims::new(&account, 60).unwrap();

        assert_eq!(claims.account_id(), account.id());
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_zero_days_is_expired() {
        let claims = AuthClaims::new(&account(), 0).unwrap();
        assert!(claims.is_expired());
    }
}
