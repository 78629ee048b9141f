//! Account entity and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::password::{PasswordCredential, PasswordHasher};
use super::payload::{AuthPayload, ProfilePayload, DEFAULT_IMAGE_URL};
use super::token::TokenIssuer;
use super::validation::{validate_email, validate_username, ValidationErrors};
use crate::domain::DomainError;

/// Account identifier, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an article living in the content collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ArticleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every stored field of an account, used when loading from a store
#[derive(Debug, Clone)]
pub struct AccountParts {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub credential: Option<PasswordCredential>,
    pub favorites: Vec<ArticleId>,
    pub following: Vec<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered member of the blogging platform
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    id: AccountId,
    /// Stored lowercased
    username: String,
    /// Stored lowercased
    email: String,
    bio: Option<String>,
    image: Option<String>,
    /// Salt and hash - never exposed in serialization
    #[serde(skip)]
    credential: Option<PasswordCredential>,
    favorites: Vec<ArticleId>,
    following: Vec<AccountId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account without a password
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: AccountId::new(),
            username: username.into().to_lowercase(),
            email: email.into().to_lowercase(),
            bio: None,
            image: None,
            credential: None,
            favorites: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an account from stored fields
    pub fn restore(parts: AccountParts) -> Self {
        let mut favorites = Vec::with_capacity(parts.favorites.len());
        for id in parts.favorites {
            if !favorites.contains(&id) {
                favorites.push(id);
            }
        }

        let mut following = Vec::with_capacity(parts.following.len());
        for id in parts.following {
            if !following.contains(&id) {
                following.push(id);
            }
        }

        Self {
            id: parts.id,
            username: parts.username.to_lowercase(),
            email: parts.email.to_lowercase(),
            bio: parts.bio,
            image: parts.image,
            credential: parts.credential,
            favorites,
            following,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn credential(&self) -> Option<&PasswordCredential> {
        self.credential.as_ref()
    }

    pub fn has_password(&self) -> bool {
        self.credential.is_some()
    }

    pub fn favorites(&self) -> &[ArticleId] {
        &self.favorites
    }

    pub fn following(&self) -> &[AccountId] {
        &self.following
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check the username and email rules
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_username(&self.username));
        errors.check(validate_email(&self.email));
        errors.into_result()
    }

    // Profile edits

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into().to_lowercase();
        self.touch();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into().to_lowercase();
        self.touch();
    }

    pub fn set_bio(&mut self, bio: Option<String>) {
        self.bio = bio;
        self.touch();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.image = image;
        self.touch();
    }

    // Credentials

    /// Replace the stored credential with one derived from `password`
    ///
    /// Only changes this value; the caller saves it.
    pub fn set_password<H>(&mut self, hasher: &H, password: &str) -> Result<(), DomainError>
    where
        H: PasswordHasher + ?Sized,
    {
        self.credential = Some(hasher.hash(password)?);
        self.touch();
        Ok(())
    }

    /// Whether `password` matches the stored credential
    pub fn valid_password<H>(&self, hasher: &H, password: &str) -> bool
    where
        H: PasswordHasher + ?Sized,
    {
        match &self.credential {
            Some(credential) => hasher.verify(password, credential),
            None => false,
        }
    }

    /// Issue a signed token identifying this account
    pub fn generate_auth_token<T>(&self, issuer: &T) -> Result<String, DomainError>
    where
        T: TokenIssuer + ?Sized,
    {
        issuer.issue(self)
    }

    // Payloads

    pub fn to_auth_payload<T>(&self, issuer: &T) -> Result<AuthPayload, DomainError>
    where
        T: TokenIssuer + ?Sized,
    {
        Ok(AuthPayload {
            username: self.username.clone(),
            email: self.email.clone(),
            token: self.generate_auth_token(issuer)?,
            bio: self.bio.clone(),
            image: self.image.clone(),
        })
    }

    /// Public view of this account as seen by `viewer`
    ///
    /// `following` reflects the viewer's own follow list.
    pub fn to_profile_payload(&self, viewer: Option<&Account>) -> ProfilePayload {
        ProfilePayload {
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self
                .image
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            following: viewer.is_some_and(|v| v.is_following(&self.id)),
        }
    }

    // Relationships

    /// Add an article to favorites. Returns false if it was already there.
    pub fn favorite(&mut self, article_id: ArticleId) -> bool {
        if self.is_favorite(&article_id) {
            return false;
        }

        self.favorites.push(article_id);
        self.touch();
        true
    }

    /// Remove an article from favorites. Returns false if it was not there.
    pub fn unfavorite(&mut self, article_id: &ArticleId) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|id| id != article_id);

        let removed = self.favorites.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn is_favorite(&self, article_id: &ArticleId) -> bool {
        self.favorites.contains(article_id)
    }

    /// Start following an account. Returns false if already following.
    pub fn follow(&mut self, account_id: AccountId) -> bool {
        if self.is_following(&account_id) {
            return false;
        }

        self.following.push(account_id);
        self.touch();
        true
    }

    /// Stop following an account. Returns false if not following.
    pub fn unfollow(&mut self, account_id: &AccountId) -> bool {
        let before = self.following.len();
        self.following.retain(|id| id != account_id);

        let removed = self.following.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn is_following(&self, account_id: &AccountId) -> bool {
        self.following.contains(account_id)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
