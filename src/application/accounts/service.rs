//! Account lifecycle service — application-layer orchestration
//!
//! Signup, verification, login/refresh, self-service update (including the
//! password-change flow that revokes the submitted refresh token), email
//! change and deletion all live here. HTTP handlers are thin wrappers.
//!
//! The acting principal is always passed in explicitly; nothing here reads
//! an ambient "current user".

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, RevokedTokenRepositoryInterface, SignupDto,
    UpdateAccountDto, User, UserRepositoryInterface,
};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig, TokenKind};
use crate::infrastructure::crypto::password::{
    hash_password, validate_password_strength, verify_password,
};
use crate::infrastructure::email::{change_email_email, verification_email, Mailer};

/// Token pair returned after a successful login.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct AccountService {
    users: Arc<dyn UserRepositoryInterface>,
    revoked_tokens: Arc<dyn RevokedTokenRepositoryInterface>,
    mailer: Arc<dyn Mailer>,
    jwt_config: JwtConfig,
    /// Public hostname embedded in email links
    dns: String,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        revoked_tokens: Arc<dyn RevokedTokenRepositoryInterface>,
        mailer: Arc<dyn Mailer>,
        jwt_config: JwtConfig,
        dns: String,
    ) -> Self {
        Self {
            users,
            revoked_tokens,
            mailer,
            jwt_config,
            dns,
        }
    }

    // ── Signup & verification ───────────────────────────────────

    /// Create a user plus its profile, then send the verification email.
    ///
    /// The user+profile insert is a single transaction; the email is sent
    /// after commit and a delivery failure leaves the account unverified
    /// without failing the request.
    pub async fn signup(&self, dto: SignupDto) -> DomainResult<User> {
        if dto.password != dto.password_confirmation {
            return Err(DomainError::Validation(
                "password and password confirmation must be equal".into(),
            ));
        }
        validate_password_strength(&dto.password, &dto.username)
            .map_err(|msg| DomainError::Validation(msg.into()))?;

        if self.users.get_user_by_username(&dto.username).await?.is_some() {
            return Err(DomainError::Validation(
                "a user with this username already exists".into(),
            ));
        }
        if self.users.get_user_by_email(&dto.email).await?.is_some() {
            return Err(DomainError::Validation(
                "a user with this email already exists".into(),
            ));
        }

        let password_hash = hash_password(&dto.password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let user = self
            .users
            .create_user_with_profile(CreateUserDto {
                username: dto.username,
                email: dto.email,
                password_hash,
                first_name: dto.first_name,
                last_name: dto.last_name,
                phone_number: dto.phone_number,
            })
            .await?;

        self.send_verification_email(&user).await;

        info!(user_id = %user.id, username = %user.username, "New user signed up");
        Ok(user)
    }

    /// Consume an email-confirmation token and mark the user verified.
    ///
    /// Re-verification is rejected, not a no-op: a consumed token fails even
    /// while its signature and expiry are still good.
    pub async fn verify(&self, token: &str) -> DomainResult<User> {
        let claims = verify_token(token, TokenKind::EmailConfirmation, &self.jwt_config)
            .map_err(|_| DomainError::Validation("token is not valid".into()))?;

        let user = self
            .users
            .get_user_by_username(&claims.username)
            .await?
            .ok_or_else(|| DomainError::Validation("token is not valid".into()))?;

        if user.is_email_verified {
            return Err(DomainError::Validation("user is already verified".into()));
        }

        let verified = self
            .users
            .mark_email_verified(&user.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user.id,
            })?;

        info!(username = %verified.username, "User verified their email");
        Ok(verified)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate username + password and return an access/refresh pair.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthTokens> {
        let Some(user) = self.users.get_user_by_username(username).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let access = create_token(&user.id, &user.username, TokenKind::Access, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;
        let refresh = create_token(&user.id, &user.username, TokenKind::Refresh, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        Ok(AuthTokens {
            access,
            refresh,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.access_token_minutes * 60,
        })
    }

    /// Exchange a refresh token for a new access token. Revoked, expired,
    /// malformed or wrong-kind tokens are all rejected the same way.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> DomainResult<String> {
        let claims = verify_token(refresh_token, TokenKind::Refresh, &self.jwt_config)
            .map_err(|_| DomainError::Unauthorized("Invalid refresh token".into()))?;

        if self.revoked_tokens.is_revoked(&claims.jti).await? {
            return Err(DomainError::Unauthorized(
                "Refresh token has been revoked".into(),
            ));
        }

        let user = self
            .users
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid refresh token".into()))?;

        create_token(&user.id, &user.username, TokenKind::Access, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.users.get_user_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        self.users.get_user_by_id(id).await
    }

    // ── Self-service update ─────────────────────────────────────

    /// Update the acting user's own account. Username, first/last name and
    /// phone number may change freely; email is read-only here. If the
    /// password-change group is present, all four fields must be, and the
    /// submitted refresh token is revoked once the new password is stored.
    pub async fn update_account(&self, user: &User, dto: UpdateAccountDto) -> DomainResult<User> {
        // Validate the whole password-change group before mutating anything.
        let password_change = if dto.wants_password_change() {
            let missing = dto.missing_password_fields();
            if !missing.is_empty() {
                return Err(DomainError::Validation(format!(
                    "{} must be provided to change the password",
                    missing.join(", ")
                )));
            }

            let password = dto.password.as_deref().unwrap_or_default();
            let new_password = dto.new_password.as_deref().unwrap_or_default();
            let confirmation = dto.new_password_confirmation.as_deref().unwrap_or_default();
            let refresh_token = dto.refresh_token.as_deref().unwrap_or_default();

            let valid = verify_password(password, &user.password_hash).unwrap_or(false);
            if !valid {
                return Err(DomainError::Validation("password is wrong".into()));
            }

            if new_password != confirmation {
                return Err(DomainError::Validation(
                    "new password and its confirmation must be equal".into(),
                ));
            }

            let effective_username = dto.username.as_deref().unwrap_or(&user.username);
            validate_password_strength(new_password, effective_username)
                .map_err(|msg| DomainError::Validation(msg.into()))?;

            let claims = verify_token(refresh_token, TokenKind::Refresh, &self.jwt_config)
                .map_err(|_| {
                    DomainError::Validation("refresh token is not valid for this user".into())
                })?;
            if claims.sub != user.id {
                return Err(DomainError::Validation(
                    "refresh token is not valid for this user".into(),
                ));
            }

            Some((new_password.to_string(), claims))
        } else {
            None
        };

        let profile_fields = dto.profile_fields();
        let has_field_updates = profile_fields.username.is_some()
            || profile_fields.first_name.is_some()
            || profile_fields.last_name.is_some()
            || profile_fields.phone_number.is_some();

        if has_field_updates {
            if let Some(new_username) = profile_fields.username.as_deref() {
                if new_username != user.username
                    && self.users.get_user_by_username(new_username).await?.is_some()
                {
                    return Err(DomainError::Validation(
                        "a user with this username already exists".into(),
                    ));
                }
            }

            self.users
                .update_user(&user.id, profile_fields)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "User",
                    field: "id",
                    value: user.id.clone(),
                })?;
        }

        if let Some((new_password, claims)) = password_change {
            let new_hash = hash_password(&new_password)
                .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;
            self.users.update_user_password(&user.id, &new_hash).await?;

            // The session that just changed the password is invalidated; any
            // refresh token not submitted here stays valid.
            self.revoked_tokens
                .revoke(&claims.jti, &user.id, claims.expires_at())
                .await?;

            info!(user_id = %user.id, "Password changed, submitted refresh token revoked");
        }

        self.users
            .get_user_by_id(&user.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user.id.clone(),
            })
    }

    // ── Email change ────────────────────────────────────────────

    /// Email a change-email token to the account's current address.
    pub async fn request_email_change(&self, user: &User) -> DomainResult<()> {
        let token = create_token(&user.id, &user.username, TokenKind::ChangeEmail, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        self.mailer
            .send(&change_email_email(user, &token, &self.dns))
            .await?;

        info!(user_id = %user.id, "Email change requested");
        Ok(())
    }

    /// Apply an email change: the new address becomes current and must be
    /// verified again from scratch.
    pub async fn change_email(
        &self,
        user: &User,
        token: &str,
        new_email: &str,
    ) -> DomainResult<User> {
        let claims = verify_token(token, TokenKind::ChangeEmail, &self.jwt_config)
            .map_err(|_| DomainError::Validation("token is not valid".into()))?;
        if claims.sub != user.id {
            return Err(DomainError::Validation(
                "token is not valid for this user".into(),
            ));
        }

        if let Some(existing) = self.users.get_user_by_email(new_email).await? {
            if existing.id != user.id {
                return Err(DomainError::Validation(
                    "a user with this email already exists".into(),
                ));
            }
        }

        let updated = self
            .users
            .update_user_email(&user.id, new_email)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user.id.clone(),
            })?;

        self.send_verification_email(&updated).await;

        info!(user_id = %updated.id, "Email changed, re-verification required");
        Ok(updated)
    }

    // ── Deletion ────────────────────────────────────────────────

    /// Delete the account. The profile and its follow edges go with it.
    pub async fn delete_account(&self, user: &User) -> DomainResult<()> {
        self.users.delete_user(&user.id).await?;
        info!(user_id = %user.id, username = %user.username, "Account deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn send_verification_email(&self, user: &User) {
        let token = match create_token(
            &user.id,
            &user.username,
            TokenKind::EmailConfirmation,
            &self.jwt_config,
        ) {
            Ok(token) => token,
            Err(e) => {
                error!(user_id = %user.id, "Failed to create verification token: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .mailer
            .send(&verification_email(user, &token, &self.dns))
            .await
        {
            // The account stays unverified; there is no automatic resend.
            error!(user_id = %user.id, "Failed to send verification email: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::test_fakes::{InMemoryStore, RecordingMailer};

    fn setup() -> (Arc<InMemoryStore>, Arc<RecordingMailer>, AccountService) {
        setup_with_mailer(RecordingMailer::default())
    }

    fn setup_with_mailer(
        mailer: RecordingMailer,
    ) -> (Arc<InMemoryStore>, Arc<RecordingMailer>, AccountService) {
        let store = Arc::new(InMemoryStore::default());
        let mailer = Arc::new(mailer);
        let service = AccountService::new(
            store.clone(),
            store.clone(),
            mailer.clone(),
            JwtConfig::default(),
            "platzigram.com".to_string(),
        );
        (store, mailer, service)
    }

    fn signup_dto(username: &str, email: &str) -> SignupDto {
        SignupDto {
            username: username.to_string(),
            email: email.to_string(),
            password: "luis1234".to_string(),
            password_confirmation: "luis1234".to_string(),
            first_name: "Luis".to_string(),
            last_name: "Perez".to_string(),
            phone_number: "+14687897977".to_string(),
        }
    }

    fn assert_validation(err: DomainError, needle: &str) {
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains(needle), "message {:?} missing {:?}", msg, needle)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    // ── Signup ──────────────────────────────────────────────────

    #[tokio::test]
    async fn signup_creates_one_user_and_one_profile() {
        let (store, mailer, service) = setup();

        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        assert_eq!(store.users.lock().unwrap().len(), 1);
        assert_eq!(store.profiles.lock().unwrap().len(), 1);
        assert!(!user.is_email_verified);
        // The stored password is hashed, never the submitted plaintext
        assert_ne!(user.password_hash, "luis1234");
        assert!(verify_password("luis1234", &user.password_hash).unwrap());
        // Exactly one outbound email
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn signup_rejects_mismatched_confirmation() {
        let (_, _, service) = setup();
        let mut dto = signup_dto("luis", "luis@gmail.com");
        dto.password_confirmation = "something-else".to_string();

        let err = service.signup(dto).await.unwrap_err();
        assert_validation(err, "must be equal");
    }

    #[tokio::test]
    async fn signup_rejects_weak_password() {
        let (_, _, service) = setup();
        let mut dto = signup_dto("luis", "luis@gmail.com");
        dto.password = "123456789".to_string();
        dto.password_confirmation = "123456789".to_string();

        let err = service.signup(dto).await.unwrap_err();
        assert_validation(err, "numeric");
    }

    #[tokio::test]
    async fn signup_rejects_taken_username_and_email() {
        let (_, _, service) = setup();
        service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let err = service
            .signup(signup_dto("luis", "other@gmail.com"))
            .await
            .unwrap_err();
        assert_validation(err, "username already exists");

        let err = service
            .signup(signup_dto("other", "luis@gmail.com"))
            .await
            .unwrap_err();
        assert_validation(err, "email already exists");
    }

    #[tokio::test]
    async fn signup_survives_email_delivery_failure() {
        let (store, _, service) = setup_with_mailer(RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        });

        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        assert_eq!(store.users.lock().unwrap().len(), 1);
        assert!(!user.is_email_verified);
    }

    // ── Verification ────────────────────────────────────────────

    #[tokio::test]
    async fn verify_flips_flag_exactly_once() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let token = create_token(
            &user.id,
            &user.username,
            TokenKind::EmailConfirmation,
            &JwtConfig::default(),
        )
        .unwrap();

        let verified = service.verify(&token).await.unwrap();
        assert!(verified.is_email_verified);

        // A consumed token fails even though signature and expiry still hold
        let err = service.verify(&token).await.unwrap_err();
        assert_validation(err, "already verified");
    }

    #[tokio::test]
    async fn verify_rejects_other_token_kinds() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let access =
            create_token(&user.id, &user.username, TokenKind::Access, &JwtConfig::default())
                .unwrap();

        let err = service.verify(&access).await.unwrap_err();
        assert_validation(err, "token is not valid");
    }

    #[tokio::test]
    async fn verify_rejects_garbage_token() {
        let (_, _, service) = setup();
        let err = service.verify("not-a-jwt").await.unwrap_err();
        assert_validation(err, "token is not valid");
    }

    // ── Login & refresh ─────────────────────────────────────────

    #[tokio::test]
    async fn login_returns_token_pair() {
        let (_, _, service) = setup();
        service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let tokens = service.login("luis", "luis1234").await.unwrap();
        assert_eq!(tokens.token_type, "Bearer");

        let claims =
            verify_token(&tokens.access, TokenKind::Access, &JwtConfig::default()).unwrap();
        assert_eq!(claims.username, "luis");
        assert!(verify_token(&tokens.refresh, TokenKind::Refresh, &JwtConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let (_, _, service) = setup();
        service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        assert!(matches!(
            service.login("luis", "wrong-password").await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login("nobody", "luis1234").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn refresh_exchanges_for_new_access_token() {
        let (_, _, service) = setup();
        service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let tokens = service.login("luis", "luis1234").await.unwrap();

        let access = service.refresh_access_token(&tokens.refresh).await.unwrap();
        let claims = verify_token(&access, TokenKind::Access, &JwtConfig::default()).unwrap();
        assert_eq!(claims.username, "luis");
    }

    #[tokio::test]
    async fn refresh_rejects_non_refresh_kinds() {
        let (_, _, service) = setup();
        service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let tokens = service.login("luis", "luis1234").await.unwrap();

        // An access token is never accepted where a refresh token is expected
        assert!(matches!(
            service.refresh_access_token(&tokens.access).await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    // ── Self-service update ─────────────────────────────────────

    #[tokio::test]
    async fn update_plain_fields_leaves_email_alone() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let updated = service
            .update_account(
                &user,
                UpdateAccountDto {
                    username: Some("pablo".to_string()),
                    first_name: Some("Pablo".to_string()),
                    phone_number: Some("+15464894984".to_string()),
                    ..UpdateAccountDto::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "pablo");
        assert_eq!(updated.first_name, "Pablo");
        assert_eq!(updated.email, "luis@gmail.com");
        assert_eq!(updated.last_name, "Perez");
    }

    #[tokio::test]
    async fn update_names_every_missing_password_field() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let err = service
            .update_account(
                &user,
                UpdateAccountDto {
                    password: Some("luis1234".to_string()),
                    ..UpdateAccountDto::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("new_password"));
                assert!(msg.contains("new_password_confirmation"));
                assert!(msg.contains("refresh_token"));
                // The field that was supplied is not reported missing
                assert!(!msg.starts_with("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_rejects_wrong_current_password() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let tokens = service.login("luis", "luis1234").await.unwrap();

        let err = service
            .update_account(
                &user,
                UpdateAccountDto {
                    password: Some("not-my-password".to_string()),
                    new_password: Some("pablo123456".to_string()),
                    new_password_confirmation: Some("pablo123456".to_string()),
                    refresh_token: Some(tokens.refresh),
                    ..UpdateAccountDto::default()
                },
            )
            .await
            .unwrap_err();

        assert_validation(err, "password is wrong");
    }

    #[tokio::test]
    async fn update_rejects_mismatched_new_passwords() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let tokens = service.login("luis", "luis1234").await.unwrap();

        let err = service
            .update_account(
                &user,
                UpdateAccountDto {
                    password: Some("luis1234".to_string()),
                    new_password: Some("pablo123456".to_string()),
                    new_password_confirmation: Some("different123".to_string()),
                    refresh_token: Some(tokens.refresh),
                    ..UpdateAccountDto::default()
                },
            )
            .await
            .unwrap_err();

        assert_validation(err, "must be equal");
    }

    #[tokio::test]
    async fn update_rejects_foreign_refresh_token() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        service.signup(signup_dto("pablo", "pablo@gmail.com")).await.unwrap();
        let other_tokens = service.login("pablo", "luis1234").await.unwrap();

        let err = service
            .update_account(
                &user,
                UpdateAccountDto {
                    password: Some("luis1234".to_string()),
                    new_password: Some("pablo123456".to_string()),
                    new_password_confirmation: Some("pablo123456".to_string()),
                    refresh_token: Some(other_tokens.refresh),
                    ..UpdateAccountDto::default()
                },
            )
            .await
            .unwrap_err();

        assert_validation(err, "refresh token is not valid for this user");
    }

    #[tokio::test]
    async fn password_change_revokes_only_the_submitted_refresh_token() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let session_a = service.login("luis", "luis1234").await.unwrap();
        let session_b = service.login("luis", "luis1234").await.unwrap();

        service
            .update_account(
                &user,
                UpdateAccountDto {
                    password: Some("luis1234".to_string()),
                    new_password: Some("holaxd1234".to_string()),
                    new_password_confirmation: Some("holaxd1234".to_string()),
                    refresh_token: Some(session_a.refresh.clone()),
                    ..UpdateAccountDto::default()
                },
            )
            .await
            .unwrap();

        // The submitted token is dead
        assert!(matches!(
            service.refresh_access_token(&session_a.refresh).await,
            Err(DomainError::Unauthorized(_))
        ));
        // A token that was not submitted is untouched
        assert!(service.refresh_access_token(&session_b.refresh).await.is_ok());

        // The new password is live, the old one is not
        assert!(service.login("luis", "holaxd1234").await.is_ok());
        assert!(service.login("luis", "luis1234").await.is_err());
    }

    // ── Email change ────────────────────────────────────────────

    #[tokio::test]
    async fn email_change_resets_verification() {
        let (_, mailer, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();

        let token = create_token(
            &user.id,
            &user.username,
            TokenKind::EmailConfirmation,
            &JwtConfig::default(),
        )
        .unwrap();
        let user = service.verify(&token).await.unwrap();
        assert!(user.is_email_verified);

        service.request_email_change(&user).await.unwrap();
        // signup + change-email request
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);

        let change_token = create_token(
            &user.id,
            &user.username,
            TokenKind::ChangeEmail,
            &JwtConfig::default(),
        )
        .unwrap();
        let updated = service
            .change_email(&user, &change_token, "idk@gmail.com")
            .await
            .unwrap();

        assert_eq!(updated.email, "idk@gmail.com");
        // The new address must be verified from scratch
        assert!(!updated.is_email_verified);
        // A fresh verification email went out
        assert_eq!(mailer.sent.lock().unwrap().len(), 3);
        assert_eq!(mailer.sent.lock().unwrap().last().unwrap().to, "idk@gmail.com");
    }

    #[tokio::test]
    async fn email_change_rejects_foreign_token() {
        let (_, _, service) = setup();
        let user = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let other = service.signup(signup_dto("pablo", "pablo@gmail.com")).await.unwrap();

        let token = create_token(
            &other.id,
            &other.username,
            TokenKind::ChangeEmail,
            &JwtConfig::default(),
        )
        .unwrap();

        let err = service
            .change_email(&user, &token, "idk@gmail.com")
            .await
            .unwrap_err();
        assert_validation(err, "not valid for this user");
    }

    // ── Deletion ────────────────────────────────────────────────

    #[tokio::test]
    async fn delete_cascades_to_own_profile_only() {
        let (store, _, service) = setup();
        let luis = service.signup(signup_dto("luis", "luis@gmail.com")).await.unwrap();
        let pablo = service.signup(signup_dto("pablo", "pablo@gmail.com")).await.unwrap();

        let luis_profile = store.profile_id_for_user(&luis.id).unwrap();
        let pablo_profile = store.profile_id_for_user(&pablo.id).unwrap();
        store
            .edges
            .lock()
            .unwrap()
            .insert((pablo_profile.clone(), luis_profile.clone()));

        service.delete_account(&luis).await.unwrap();

        assert_eq!(store.users.lock().unwrap().len(), 1);
        assert_eq!(store.profiles.lock().unwrap().len(), 1);
        // The follower's profile survives; the dangling edge does not
        assert!(store.profile_id_for_user(&pablo.id).is_some());
        assert!(store.edges.lock().unwrap().is_empty());
    }
}
