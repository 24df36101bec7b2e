/// Session lifecycle
///
/// A session moves Anonymous -> Authenticated on login, may be Refreshed any
/// number of times (new access token, same refresh token), and ends Revoked
/// when its refresh token is revoked. An access token minted before the
/// revocation stays valid until its own expiry.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::Duration;
use uuid::Uuid;

use crate::auth::header::extract_bearer_token;
use crate::auth::jwt::{issue_access_token, verify_access_token};
use crate::auth::password::verify_password;
use crate::auth::refresh_token::{issue_refresh_token, revoke_refresh_token, validate_refresh_token};
use crate::configuration::AuthSettings;
use crate::error::{AppError, CredentialError};
use crate::models::{RefreshTokenRecord, User};
use crate::store::Store;
use crate::validators::Credentials;

/// Result of a successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshTokenRecord,
}

/// Coordinates credential checks, token minting and refresh token state.
///
/// Holds no mutable state of its own; the signing secret and lifetimes are
/// fixed at construction.
pub struct SessionCoordinator {
    store: Arc<dyn Store>,
    settings: AuthSettings,
}

impl SessionCoordinator {
    pub fn new(store: Arc<dyn Store>, settings: AuthSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    fn access_token_lifetime(&self) -> Result<Duration, AppError> {
        self.settings
            .access_token_lifetime()
            .ok_or_else(|| AppError::Internal("access token lifetime out of range".to_string()))
    }

    fn refresh_token_lifetime(&self) -> Result<Duration, AppError> {
        self.settings
            .refresh_token_lifetime()
            .ok_or_else(|| AppError::Internal("refresh token lifetime out of range".to_string()))
    }

    /// Verify email and password, then issue an access token and a stored
    /// refresh token.
    ///
    /// # Errors
    /// * `AppError::AccountNotFound` - no account for the email (a credential
    ///   mismatch instead when `uniform_login_errors` is set)
    /// * `AppError::Credential` - wrong password or unreadable stored digest
    /// * `AppError::Storage` - lookup or refresh token persistence failed
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AppError> {
        let user = match self.store.get_user_by_email(credentials.email.as_ref()).await? {
            Some(user) => user,
            None if self.settings.uniform_login_errors => {
                return Err(CredentialError::Mismatch.into());
            }
            None => return Err(AppError::AccountNotFound),
        };

        verify_password(credentials.password.expose(), &user.hashed_password)?;

        let access_token = issue_access_token(
            user.id,
            &self.settings.secret,
            self.access_token_lifetime()?,
        )?;
        let refresh_token = issue_refresh_token(
            self.store.as_ref(),
            user.id,
            self.refresh_token_lifetime()?,
        )
        .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange the refresh token in the Authorization header for a new
    /// access token. The refresh token itself is left as is.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let token = extract_bearer_token(headers)?;
        let record = validate_refresh_token(self.store.as_ref(), &token).await?;

        let access_token = issue_access_token(
            record.user_id,
            &self.settings.secret,
            self.access_token_lifetime()?,
        )?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the refresh token in the Authorization header.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = extract_bearer_token(headers)?;
        let record = validate_refresh_token(self.store.as_ref(), &token).await?;

        revoke_refresh_token(self.store.as_ref(), &record.token).await?;

        tracing::info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }

    /// Resolve the acting user from the access token in the Authorization
    /// header. Ownership checks on the target resource are the caller's job.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = extract_bearer_token(headers)?;
        Ok(verify_access_token(&token, &self.settings.secret)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{hash_password, MIN_PASSWORD_COST};
    use crate::configuration::{DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_REFRESH_TOKEN_EXPIRY};
    use crate::error::{HeaderError, SessionError, TokenError};
    use crate::models::NewUser;
    use crate::store::{InMemoryStore, RefreshTokenStore, UserStore};
    use crate::validators::{Password, UserEmail};
    use actix_web::http::header::{HeaderValue, AUTHORIZATION};

    const EMAIL: &str = "walt@breakingbad.com";
    const PASSWORD: &str = "04234";

    fn settings(uniform_login_errors: bool) -> AuthSettings {
        AuthSettings {
            secret: "session-test-secret".into(),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
            password_cost: MIN_PASSWORD_COST,
            uniform_login_errors,
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: UserEmail::parse(email).unwrap(),
            password: Password::parse(password).unwrap(),
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    async fn coordinator(uniform_login_errors: bool) -> (SessionCoordinator, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_user(NewUser {
                email: EMAIL.into(),
                hashed_password: hash_password(PASSWORD, MIN_PASSWORD_COST).unwrap(),
            })
            .await
            .unwrap();
        let coordinator = SessionCoordinator::new(store.clone(), settings(uniform_login_errors));
        (coordinator, store)
    }

    #[tokio::test]
    async fn login_refresh_revoke_lifecycle() {
        let (sessions, _) = coordinator(false).await;

        let outcome = sessions.login(&credentials(EMAIL, PASSWORD)).await.unwrap();
        let user_id = sessions.authorize(&bearer(&outcome.access_token)).unwrap();
        assert_eq!(user_id, outcome.user.id);

        let refreshed = sessions.refresh(&bearer(&outcome.refresh_token.token)).await.unwrap();
        assert_ne!(refreshed, outcome.access_token);
        assert_eq!(sessions.authorize(&bearer(&refreshed)).unwrap(), user_id);

        sessions.revoke(&bearer(&outcome.refresh_token.token)).await.unwrap();
        let after = sessions.refresh(&bearer(&outcome.refresh_token.token)).await;
        assert!(matches!(after, Err(AppError::Session(SessionError::Revoked))));

        // Already-minted access tokens outlive the revocation.
        assert_eq!(sessions.authorize(&bearer(&refreshed)).unwrap(), user_id);
    }

    #[tokio::test]
    async fn wrong_password_is_a_credential_mismatch() {
        let (sessions, _) = coordinator(false).await;
        let result = sessions.login(&credentials(EMAIL, "wrong")).await;
        assert!(matches!(result, Err(AppError::Credential(CredentialError::Mismatch))));
    }

    #[tokio::test]
    async fn unknown_email_depends_on_uniform_errors() {
        let (sessions, _) = coordinator(false).await;
        let result = sessions.login(&credentials("nobody@example.com", PASSWORD)).await;
        assert!(matches!(result, Err(AppError::AccountNotFound)));

        let (sessions, _) = coordinator(true).await;
        let result = sessions.login(&credentials("nobody@example.com", PASSWORD)).await;
        assert!(matches!(result, Err(AppError::Credential(CredentialError::Mismatch))));
    }

    #[tokio::test]
    async fn concurrent_logins_get_separate_refresh_tokens() {
        let (sessions, store) = coordinator(false).await;
        let creds = credentials(EMAIL, PASSWORD);

        let (a, b) = tokio::join!(sessions.login(&creds), sessions.login(&creds));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.refresh_token.token, b.refresh_token.token);
        assert!(store.get_refresh_token(&a.refresh_token.token).await.unwrap().is_some());
        assert!(store.get_refresh_token(&b.refresh_token.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn refresh_without_header_is_missing() {
        let (sessions, _) = coordinator(false).await;
        let result = sessions.refresh(&HeaderMap::new()).await;
        assert!(matches!(result, Err(AppError::Header(HeaderError::Missing))));
    }

    #[tokio::test]
    async fn access_token_is_not_a_refresh_token() {
        let (sessions, _) = coordinator(false).await;
        let outcome = sessions.login(&credentials(EMAIL, PASSWORD)).await.unwrap();

        let result = sessions.refresh(&bearer(&outcome.access_token)).await;
        assert!(matches!(result, Err(AppError::Session(SessionError::NotFound))));
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let (sessions, _) = coordinator(false).await;
        let outcome = sessions.login(&credentials(EMAIL, PASSWORD)).await.unwrap();

        let result = sessions.authorize(&bearer(&outcome.refresh_token.token));
        assert!(matches!(result, Err(AppError::Token(TokenError::Malformed(_)))));
    }

    #[tokio::test]
    async fn revoking_twice_is_unauthorized_the_second_time() {
        let (sessions, _) = coordinator(false).await;
        let outcome = sessions.login(&credentials(EMAIL, PASSWORD)).await.unwrap();
        let headers = bearer(&outcome.refresh_token.token);

        sessions.revoke(&headers).await.unwrap();
        let again = sessions.revoke(&headers).await.unwrap_err();
        assert!(again.is_unauthorized());
    }

    #[tokio::test]
    async fn oversized_lifetime_fails_the_request_instead_of_panicking() {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_user(NewUser {
                email: EMAIL.into(),
                hashed_password: hash_password(PASSWORD, MIN_PASSWORD_COST).unwrap(),
            })
            .await
            .unwrap();
        let mut oversized = settings(false);
        oversized.refresh_token_expiry = i64::MAX / 1000;
        let sessions = SessionCoordinator::new(store.clone(), oversized);

        let result = sessions.login(&credentials(EMAIL, PASSWORD)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let mut unrepresentable = settings(false);
        unrepresentable.access_token_expiry = i64::MAX;
        let sessions = SessionCoordinator::new(store, unrepresentable);
        let result = sessions.login(&credentials(EMAIL, PASSWORD)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
