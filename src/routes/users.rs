/// Account Routes
///
/// Signup and self-service account updates.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, AuthenticatedUser, SessionCoordinator};
use crate::error::{AppError, ErrorContext};
use crate::models::{NewUser, User};
use crate::store::Store;
use crate::validators::Credentials;

/// Email and password pair, as sent to signup, update and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account; the password digest never leaves the server
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

fn hashed_user(credentials: Credentials, cost: u32) -> Result<NewUser, AppError> {
    let hashed_password = hash_password(credentials.password.expose(), cost)?;
    Ok(NewUser {
        email: credentials.email.into_inner(),
        hashed_password,
    })
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn Store>,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let credentials = Credentials::parse(&form.email, &form.password)?;
    let new_user = hashed_user(credentials, sessions.settings().password_cost)?;

    let user = store
        .create_user(new_user)
        .await
        .map_err(|e| context.record(e.into()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replaces the caller's email and password. Existing tokens stay valid.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 400: invalid email or password
/// - 404: the account was deleted after the token was issued
/// - 409: email belongs to another account
pub async fn update_user(
    caller: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn Store>,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(caller.id());

    let credentials = Credentials::parse(&form.email, &form.password)?;
    let changes = hashed_user(credentials, sessions.settings().password_cost)?;

    let user = store
        .update_user(caller.id(), changes)
        .await
        .map_err(|e| context.record(e.into()))?
        .ok_or_else(|| context.record(AppError::NotFound("User".into())))?;

    tracing::info!(request_id = %context.request_id, user_id = %user.id, "User updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
