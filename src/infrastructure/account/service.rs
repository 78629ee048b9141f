//! Account service for registration, login, profiles and relationships

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::account::{
    validate_email, validate_password, validate_registration, validate_username, Account,
    AccountField, AccountId, AccountRepository, ArticleId, AuthPayload, PasswordHasher,
    ProfilePayload, TokenIssuer, ValidationErrors,
};
use crate::domain::DomainError;

/// Request for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Profile edits. `None` leaves a field unchanged; an empty bio or image
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

/// Account service for authentication and relationship management
#[derive(Debug)]
pub struct AccountService<R: AccountRepository, H: PasswordHasher, T: TokenIssuer> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R: AccountRepository, H: PasswordHasher, T: TokenIssuer> AccountService<R, H, T> {
    /// Create a new account service
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Register a new account
    pub async fn register(&self, request: RegisterRequest) -> Result<Account, DomainError> {
        validate_registration(&request.username, &request.email, &request.password)?;

        let mut taken = Vec::new();
        if self.repository.username_exists(&request.username).await? {
            taken.push(AccountField::Username);
        }
        if self.repository.email_exists(&request.email).await? {
            taken.push(AccountField::Email);
        }
        if !taken.is_empty() {
            return Err(DomainError::duplicate_fields(taken));
        }

        let mut account = Account::new(&request.username, &request.email);
        account.set_password(self.hasher.as_ref(), &request.password)?;

        // The store re-checks uniqueness, so a racing registration still
        // surfaces as DuplicateField
        let account = self.repository.create(account).await?;

        info!(account_id = %account.id(), username = account.username(), "Registered account");
        Ok(account)
    }

    /// Log in with email and password
    ///
    /// Returns `None` for an unknown email or a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<Account>, DomainError> {
        let mut errors = ValidationErrors::new();
        if email.trim().is_empty() {
            errors.check(validate_email(email));
        }
        errors.check(validate_password(password));
        errors.into_result()?;

        let account = match self.repository.get_by_email(email).await? {
            Some(account) => account,
            None => {
                debug!("Login for unknown email");
                return Ok(None);
            }
        };

        if !account.valid_password(self.hasher.as_ref(), password) {
            warn!(account_id = %account.id(), "Rejected login with wrong password");
            return Ok(None);
        }

        info!(account_id = %account.id(), "Account logged in");
        Ok(Some(account))
    }

    /// Resolve the account a token was issued to
    pub async fn authenticate_token(&self, token: &str) -> Result<Account, DomainError> {
        let claims = self.tokens.verify(token)?;

        self.repository
            .get(claims.account_id())
            .await?
            .ok_or_else(|| DomainError::credential("Token refers to an account that no longer exists"))
    }

    /// Payload returned to the account owner, including a fresh token
    pub fn auth_payload(&self, account: &Account) -> Result<AuthPayload, DomainError> {
        account.to_auth_payload(self.tokens.as_ref())
    }

    /// Get an account by ID
    pub async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        self.repository.get(id).await
    }

    /// Get an account by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>, DomainError> {
        self.repository.get_by_username(username).await
    }

    /// Apply profile edits to an account
    pub async fn update(
        &self,
        id: &AccountId,
        request: UpdateAccountRequest,
    ) -> Result<Account, DomainError> {
        let mut account = self.require(id).await?;

        let mut errors = ValidationErrors::new();
        if let Some(username) = &request.username {
            errors.check(validate_username(username));
        }
        if let Some(email) = &request.email {
            errors.check(validate_email(email));
        }
        if let Some(password) = &request.password {
            errors.check(validate_password(password));
        }
        errors.into_result()?;

        let username = request
            .username
            .filter(|username| username.to_lowercase() != account.username());
        let email = request
            .email
            .filter(|email| email.to_lowercase() != account.email());

        let mut taken = Vec::new();
        if let Some(username) = &username {
            if self.repository.username_exists(username).await? {
                taken.push(AccountField::Username);
            }
        }
        if let Some(email) = &email {
            if self.repository.email_exists(email).await? {
                taken.push(AccountField::Email);
            }
        }
        if !taken.is_empty() {
            return Err(DomainError::duplicate_fields(taken));
        }

        if let Some(username) = username {
            account.set_username(username);
        }
        if let Some(email) = email {
            account.set_email(email);
        }

        if let Some(bio) = request.bio {
            account.set_bio(Some(bio).filter(|b| !b.is_empty()));
        }

        if let Some(image) = request.image {
            account.set_image(Some(image).filter(|i| !i.is_empty()));
        }

        if let Some(password) = request.password {
            account.set_password(self.hasher.as_ref(), &password)?;
        }

        let account = self.repository.update(&account).await?;

        info!(account_id = %account.id(), "Updated account");
        Ok(account)
    }

    /// Public profile of `username` as seen by the optional viewer
    pub async fn profile(
        &self,
        username: &str,
        viewer_id: Option<&AccountId>,
    ) -> Result<ProfilePayload, DomainError> {
        let target = self.require_username(username).await?;

        let viewer = match viewer_id {
            Some(id) => self.repository.get(id).await?,
            None => None,
        };

        Ok(target.to_profile_payload(viewer.as_ref()))
    }

    /// Follow `username` on behalf of the viewer
    pub async fn follow(
        &self,
        viewer_id: &AccountId,
        username: &str,
    ) -> Result<ProfilePayload, DomainError> {
        let mut viewer = self.require(viewer_id).await?;
        let target = self.require_username(username).await?;

        let added = viewer.follow(*target.id());
        let viewer = self.repository.update(&viewer).await?;

        info!(account_id = %viewer.id(), target_id = %target.id(), added, "Followed account");
        Ok(target.to_profile_payload(Some(&viewer)))
    }

    /// Stop following `username` on behalf of the viewer
    pub async fn unfollow(
        &self,
        viewer_id: &AccountId,
        username: &str,
    ) -> Result<ProfilePayload, DomainError> {
        let mut viewer = self.require(viewer_id).await?;
        let target = self.require_username(username).await?;

        let removed = viewer.unfollow(target.id());
        let viewer = self.repository.update(&viewer).await?;

        info!(account_id = %viewer.id(), target_id = %target.id(), removed, "Unfollowed account");
        Ok(target.to_profile_payload(Some(&viewer)))
    }

    /// Add an article to the account's favorites
    pub async fn favorite(
        &self,
        account_id: &AccountId,
        article_id: ArticleId,
    ) -> Result<Account, DomainError> {
        let mut account = self.require(account_id).await?;

        let added = account.favorite(article_id);
        let account = self.repository.update(&account).await?;

        info!(account_id = %account.id(), article_id = %article_id, added, "Favorited article");
        Ok(account)
    }

    /// Remove an article from the account's favorites
    pub async fn unfavorite(
        &self,
        account_id: &AccountId,
        article_id: &ArticleId,
    ) -> Result<Account, DomainError> {
        let mut account = self.require(account_id).await?;

        let removed = account.unfavorite(article_id);
        let account = self.repository.update(&account).await?;

        info!(account_id = %account.id(), article_id = %article_id, removed, "Unfavorited article");
        Ok(account)
    }

    /// Delete an account
    pub async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let deleted = self.repository.delete(id).await?;
        if deleted {
            info!(account_id = %id, "Deleted account");
        }
        Ok(deleted)
    }

    async fn require(&self, id: &AccountId) -> Result<Account, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", id)))
    }

    async fn require_username(&self, username: &str) -> Result<Account, DomainError> {
        self.repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Profile '{}' not found", username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{MockAccountRepository, MockTokenIssuer, DEFAULT_IMAGE_URL};
    use crate::infrastructure::account::password::Pbkdf2Hasher;
    use crate::infrastructure::account::repository::InMemoryAccountRepository;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use tokio_test::{assert_err, assert_ok};
    use uuid::Uuid;

    type TestService = AccountService<InMemoryAccountRepository, Pbkdf2Hasher, JwtService>;

    fn create_service() -> TestService {
        let repository = Arc::new(InMemoryAccountRepository::new());
        let hasher = Arc::new(Pbkdf2Hasher::new());
        let tokens = Arc::new(JwtService::new(JwtConfig::new("test-secret", 60)).unwrap());
        AccountService::new(repository, hasher, tokens)
    }

    fn make_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn register(service: &TestService, username: &str) -> Account {
        service
            .register(make_request(
                username,
                &format!("{}@example.com", username),
                "secret123",
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_alice() {
        let service = create_service();

        let alice = service
            .register(make_request("alice", "a@example.com", "secret123"))
            .await
            .unwrap();

        let hasher = Pbkdf2Hasher::new();
        assert!(alice.valid_password(&hasher, "secret123"));
        assert!(!alice.valid_password(&hasher, "wrong"));

        let payload = service.auth_payload(&alice).unwrap();
        assert_eq!(payload.username, "alice");
        assert_eq!(payload.email, "a@example.com");
        assert!(!payload.token.is_empty());
        assert_ne!(payload.token, "token");

        let resolved = service.authenticate_token(&payload.token).await.unwrap();
        assert_eq!(resolved.id(), alice.id());
    }

    #[tokio::test]
    async fn test_register_invalid_fields() {
        let service = create_service();

        let result = service
            .register(make_request("bad name", "not-an-email", ""))
            .await;

        match result {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.has_field(AccountField::Username));
                assert!(errors.has_field(AccountField::Email));
                assert!(errors.has_field(AccountField::Password));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_username_ignores_case() {
        let service = create_service();

        assert_ok!(
            service
                .register(make_request("alice", "a@example.com", "secret123"))
                .await
        );

        let result = service
            .register(make_request("Alice", "other@example.com", "secret456"))
            .await;

        assert_eq!(
            result.unwrap_err().taken_fields(),
            &[AccountField::Username]
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = create_service();

        register(&service, "alice").await;

        let result = service
            .register(make_request("bob", "ALICE@example.com", "secret123"))
            .await;

        assert_eq!(
            result.unwrap_err().taken_fields(),
            &[AccountField::Email]
        );
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        let account = service
            .login("Alice@Example.com", "secret123")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.id(), alice.id());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = create_service();
        register(&service, "alice").await;

        let account = service.login("alice@example.com", "wrong").await.unwrap();
        assert!(account.is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let service = create_service();

        let account = service.login("ghost@example.com", "secret123").await.unwrap();
        assert!(account.is_none());
    }

    #[tokio::test]
    async fn test_login_blank_fields() {
        let service = create_service();

        let result = service.login("", "").await;
        match result {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.has_field(AccountField::Email));
                assert!(errors.has_field(AccountField::Password));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_authenticate_token_rejects_garbage() {
        let service = create_service();

        let result = service.authenticate_token("not-a-token").await;
        assert!(matches!(result, Err(DomainError::Credential { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_token_for_deleted_account() {
        let service = create_service();
        let alice = register(&service, "alice").await;
        let token = service.auth_payload(&alice).unwrap().token;

        assert!(service.delete(alice.id()).await.unwrap());

        let result = service.authenticate_token(&token).await;
        assert!(matches!(result, Err(DomainError::Credential { .. })));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        let updated = service
            .update(
                alice.id(),
                UpdateAccountRequest {
                    bio: Some("I write things".to_string()),
                    image: Some("https://img.example.com/a.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.bio(), Some("I write things"));
        assert_eq!(updated.image(), Some("https://img.example.com/a.png"));
        assert_eq!(updated.username(), "alice");

        let cleared = service
            .update(
                alice.id(),
                UpdateAccountRequest {
                    image: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(cleared.image().is_none());
        assert_eq!(cleared.bio(), Some("I write things"));
    }

    #[tokio::test]
    async fn test_update_password() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        service
            .update(
                alice.id(),
                UpdateAccountRequest {
                    password: Some("new-secret".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Old password should fail
        assert!(service
            .login("alice@example.com", "secret123")
            .await
            .unwrap()
            .is_none());

        // New password should work
        assert!(service
            .login("alice@example.com", "new-secret")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_register_reports_every_taken_field() {
        let service = create_service();
        register(&service, "alice").await;

        let error = service
            .register(make_request("alice", "alice@example.com", "secret123"))
            .await
            .unwrap_err();

        assert_eq!(
            error.taken_fields(),
            &[AccountField::Username, AccountField::Email]
        );

        let fields = error.field_errors().unwrap();
        assert_eq!(fields["username"], vec!["is already taken".to_string()]);
        assert_eq!(fields["email"], vec!["is already taken".to_string()]);
    }

    #[tokio::test]
    async fn test_update_reports_every_taken_field() {
        let service = create_service();
        register(&service, "alice").await;
        let bob = register(&service, "bob").await;

        let result = service
            .update(
                bob.id(),
                UpdateAccountRequest {
                    username: Some("alice".to_string()),
                    email: Some("ALICE@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(
            result.unwrap_err().taken_fields(),
            &[AccountField::Username, AccountField::Email]
        );

        let stored = service.get(bob.id()).await.unwrap().unwrap();
        assert_eq!(stored.username(), "bob");
    }

    #[tokio::test]
    async fn test_update_username_conflict() {
        let service = create_service();
        register(&service, "alice").await;
        let bob = register(&service, "bob").await;

        let result = service
            .update(
                bob.id(),
                UpdateAccountRequest {
                    username: Some("ALICE".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(
            result.unwrap_err().taken_fields(),
            &[AccountField::Username]
        );
    }

    #[tokio::test]
    async fn test_update_same_username_different_case() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        let updated = service
            .update(
                alice.id(),
                UpdateAccountRequest {
                    username: Some("Alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username(), "alice");
    }

    #[tokio::test]
    async fn test_update_invalid_email() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        let result = service
            .update(
                alice.id(),
                UpdateAccountRequest {
                    email: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_profile_anonymous() {
        let service = create_service();
        register(&service, "alice").await;

        let profile = service.profile("alice", None).await.unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.image, DEFAULT_IMAGE_URL);
        assert!(!profile.following);
    }

    #[tokio::test]
    async fn test_profile_missing() {
        let service = create_service();

        let result = service.profile("ghost", None).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_follow_persists() {
        let service = create_service();
        let alice = register(&service, "alice").await;
        let bob = register(&service, "bob").await;

        let before = service.profile("bob", Some(alice.id())).await.unwrap();
        assert!(!before.following);

        let profile = service.follow(alice.id(), "bob").await.unwrap();
        assert!(profile.following);

        // Reload from the store rather than trusting the returned value
        let stored = service.get(alice.id()).await.unwrap().unwrap();
        assert_eq!(stored.following().len(), 1);

        let after = service.profile("bob", Some(alice.id())).await.unwrap();
        assert!(after.following);

        // Following is one-directional
        let reverse = service.profile("alice", Some(bob.id())).await.unwrap();
        assert!(!reverse.following);
    }

    #[tokio::test]
    async fn test_follow_twice_keeps_one_entry() {
        let service = create_service();
        let alice = register(&service, "alice").await;
        register(&service, "bob").await;

        service.follow(alice.id(), "bob").await.unwrap();
        service.follow(alice.id(), "bob").await.unwrap();

        let stored = service.get(alice.id()).await.unwrap().unwrap();
        assert_eq!(stored.following().len(), 1);
    }

    #[tokio::test]
    async fn test_unfollow_persists() {
        let service = create_service();
        let alice = register(&service, "alice").await;
        register(&service, "bob").await;

        service.follow(alice.id(), "bob").await.unwrap();
        let profile = service.unfollow(alice.id(), "bob").await.unwrap();
        assert!(!profile.following);

        let stored = service.get(alice.id()).await.unwrap().unwrap();
        assert!(stored.following().is_empty());

        // Unfollowing again is harmless
        assert_ok!(service.unfollow(alice.id(), "bob").await);
    }

    #[tokio::test]
    async fn test_follow_unknown_profile() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        assert_err!(service.follow(alice.id(), "ghost").await);
    }

    #[tokio::test]
    async fn test_favorite_and_unfavorite() {
        let service = create_service();
        let alice = register(&service, "alice").await;
        let article = ArticleId::from_uuid(Uuid::new_v4());

        service.favorite(alice.id(), article).await.unwrap();
        service.favorite(alice.id(), article).await.unwrap();

        let stored = service.get(alice.id()).await.unwrap().unwrap();
        assert_eq!(stored.favorites(), &[article]);
        assert!(stored.is_favorite(&article));

        // Removing something that was never there is a no-op
        let other = ArticleId::from_uuid(Uuid::new_v4());
        assert_ok!(service.unfavorite(alice.id(), &other).await);

        let account = service.unfavorite(alice.id(), &article).await.unwrap();
        assert!(account.favorites().is_empty());

        let stored = service.get(alice.id()).await.unwrap().unwrap();
        assert!(!stored.is_favorite(&article));
    }

    #[tokio::test]
    async fn test_relationship_toggles_always_save() {
        let repository = Arc::new(MockAccountRepository::new());
        let tokens = Arc::new(MockTokenIssuer::new());
        let service = AccountService::new(repository.clone(), Arc::new(Pbkdf2Hasher::new()), tokens);

        let alice = service
            .register(make_request("alice", "a@example.com", "secret123"))
            .await
            .unwrap();
        service
            .register(make_request("bob", "b@example.com", "secret123"))
            .await
            .unwrap();

        service.follow(alice.id(), "bob").await.unwrap();
        service.follow(alice.id(), "bob").await.unwrap();
        service.unfollow(alice.id(), "bob").await.unwrap();

        let article = ArticleId::from_uuid(Uuid::new_v4());
        service.favorite(alice.id(), article).await.unwrap();
        service.unfavorite(alice.id(), &article).await.unwrap();

        assert_eq!(repository.update_count().await, 5);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repository = Arc::new(MockAccountRepository::new());
        let tokens = Arc::new(MockTokenIssuer::new());
        let service = AccountService::new(repository.clone(), Arc::new(Pbkdf2Hasher::new()), tokens);

        repository.set_should_fail(true).await;

        let result = service
            .register(make_request("alice", "a@example.com", "secret123"))
            .await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_auth_payload_with_mock_issuer() {
        let repository = Arc::new(MockAccountRepository::new());
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .times(1)
            .returning(|_| Ok("signed-token".to_string()));
        let service =
            AccountService::new(repository, Arc::new(Pbkdf2Hasher::new()), Arc::new(tokens));

        let alice = service
            .register(make_request("alice", "a@example.com", "secret123"))
            .await
            .unwrap();

        let payload = service.auth_payload(&alice).unwrap();
        assert_eq!(payload.token, "signed-token");
    }

    #[tokio::test]
    async fn test_delete() {
        let service = create_service();
        let alice = register(&service, "alice").await;

        assert!(service.delete(alice.id()).await.unwrap());
        assert!(service.get(alice.id()).await.unwrap().is_none());
        assert!(!service.delete(alice.id()).await.unwrap());
    }
}
