/// Payment provider webhook
///
/// Polka calls this when a user upgrades. The caller proves itself with
/// `Authorization: ApiKey <key>`.

use actix_web::{dev::Payload, http::header::HeaderMap, web, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::extract_api_key;
use crate::configuration::Settings;
use crate::error::{AppError, ErrorContext, HeaderError};
use crate::store::Store;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

/// Compares fixed-size digests so the key length is not observable.
fn api_key_matches(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Checks `Authorization: ApiKey <key>` against the configured key.
fn authenticate(headers: &HeaderMap, expected: &str) -> Result<(), HeaderError> {
    let key = extract_api_key(headers)?;
    if api_key_matches(&key, expected) {
        Ok(())
    } else {
        Err(HeaderError::KeyMismatch)
    }
}

/// Marker extracted only when the request carries the configured API key
pub struct PolkaCaller;

impl FromRequest for PolkaCaller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let settings = match req.app_data::<web::Data<Settings>>() {
            Some(settings) => settings,
            None => {
                return ready(Err(AppError::Internal(
                    "settings are not registered".to_string(),
                )))
            }
        };

        let result = authenticate(req.headers(), &settings.polka.api_key)
            .map(|()| PolkaCaller)
            .map_err(AppError::from);

        ready(result)
    }
}

/// POST /api/polka/webhooks
///
/// # Errors
/// - 401: missing, malformed or wrong API key
/// - 404: the event names an unknown user
pub async fn polka_webhook(
    _caller: PolkaCaller,
    event: web::Json<WebhookEvent>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    if event.event != USER_UPGRADED {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = event.data.user_id;
    let context = ErrorContext::new("user_upgrade").with_user_id(user_id);

    let found = store
        .upgrade_user(user_id)
        .await
        .map_err(|e| context.record(e.into()))?;
    if !found {
        return Err(context.record(AppError::NotFound("User".into())));
    }

    tracing::info!(request_id = %context.request_id, user_id = %user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
