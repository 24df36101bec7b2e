/// Chirp Routes
///
/// Anyone may read chirps. Posting needs an access token, and deleting also
/// needs the caller to own the chirp.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::models::{Chirp, NewChirp};
use crate::store::Store;
use crate::validators::ChirpBody;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("chirp_id".into()))
}

/// POST /api/chirps
///
/// The body is cleaned of profanity before it is stored.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 400: empty body or longer than 140 characters
pub async fn create_chirp(
    caller: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_create").with_user_id(caller.id());

    let body = ChirpBody::parse(&form.body)?;
    let chirp = store
        .create_chirp(NewChirp {
            body: body.into_inner(),
            user_id: caller.id(),
        })
        .await
        .map_err(|e| context.record(e.into()))?;

    tracing::info!(request_id = %context.request_id, chirp_id = %chirp.id, "Chirp created");

    Ok(HttpResponse::Created().json(ChirpResponse::from(chirp)))
}

/// GET /api/chirps
pub async fn list_chirps(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let chirps: Vec<ChirpResponse> = store
        .list_chirps()
        .await?
        .into_iter()
        .map(ChirpResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp".into()))?;

    Ok(HttpResponse::Ok().json(ChirpResponse::from(chirp)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: missing or invalid access token
/// - 400: id is not a UUID
/// - 404: no such chirp
/// - 403: the chirp belongs to someone else
pub async fn delete_chirp(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_delete").with_user_id(caller.id());
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = store
        .get_chirp(chirp_id)
        .await
        .map_err(|e| context.record(e.into()))?
        .ok_or_else(|| AppError::NotFound("Chirp".into()))?;

    if !chirp.is_owned_by(caller.id()) {
        return Err(context.record(AppError::Forbidden(
            "You can only delete your own chirps".into(),
        )));
    }

    // A concurrent delete may have won the race; the outcome is the same.
    store
        .delete_chirp(chirp_id)
        .await
        .map_err(|e| context.record(e.into()))?;

    tracing::info!(request_id = %context.request_id, chirp_id = %chirp_id, "Chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}
