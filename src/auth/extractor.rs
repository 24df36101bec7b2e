/// Authenticated user extractor
///
/// Protected handlers take an `AuthenticatedUser` as their first argument, so
/// the access token is checked before the body is read or storage is touched.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::session::SessionCoordinator;
use crate::error::AppError;

/// Identity resolved from a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionCoordinator>>() {
            Some(sessions) => sessions.authorize(req.headers()).map(AuthenticatedUser),
            None => Err(AppError::Internal(
                "session coordinator is not registered".to_string(),
            )),
        };

        if let Ok(user) = &result {
            tracing::debug!(user_id = %user.0, path = %req.path(), "Access token accepted");
        }
        ready(result)
    }
}
