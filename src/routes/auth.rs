/// Session Routes
///
/// Login, access token refresh and refresh token revocation. Refresh and
/// revoke take the refresh token as a bearer credential, not in the body.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::SessionCoordinator;
use crate::error::{AppError, ErrorContext};
use crate::routes::users::{CredentialsRequest, UserResponse};
use crate::validators::Credentials;

/// Account view plus the tokens minted for this session
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 400: malformed email or password
/// - 401: wrong password
/// - 404: no account for the email (401 with `uniform_login_errors`)
pub async fn login(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let credentials = Credentials::parse(&form.email, &form.password)?;
    let outcome = sessions
        .login(&credentials)
        .await
        .map_err(|e| context.record(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %outcome.user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: outcome.user.into(),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token.token,
    }))
}

/// POST /api/refresh
///
/// Mints a new access token. The refresh token is not rotated.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let token = sessions.refresh(req.headers()).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(req.headers()).await?;
    Ok(HttpResponse::NoContent().finish())
}
