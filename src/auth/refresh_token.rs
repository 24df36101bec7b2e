/// Refresh Token Management
///
/// Refresh tokens are the stateful half of a session:
/// - 32 random bytes, hex encoded, with no structure a client could parse
/// - persisted with an expiry (60 days by default) and a nullable revocation time
/// - never rotated by a refresh; they stay usable until they expire or are revoked
///
/// Not found, expired and revoked stay distinct here for logs and tests. The
/// HTTP layer folds all three into one 401.

use chrono::{Duration, Utc};
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, SessionError};
use crate::models::RefreshTokenRecord;
use crate::store::RefreshTokenStore;

const TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
///
/// 256 bits from the thread-local CSPRNG, hex encoded (64 characters).
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest of a refresh token, hex encoded
///
/// Storage adapters that write to disk key on this instead of the token.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Mint and persist a refresh token for a user
///
/// # Errors
/// Returns `AppError::Storage` if persistence fails (there is no retry), or
/// `AppError::Internal` if `lifetime` pushes the expiry past the calendar.
pub async fn issue_refresh_token<S>(
    store: &S,
    user_id: Uuid,
    lifetime: Duration,
) -> Result<RefreshTokenRecord, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = generate_refresh_token();
    let expires_at = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(|| AppError::Internal("refresh token expiry out of range".to_string()))?;

    let record = store.create_refresh_token(&token, user_id, expires_at).await?;

    tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
    Ok(record)
}

/// Validate a refresh token
///
/// Checks, in order:
/// 1. Token exists (exact match)
/// 2. Token has not expired
/// 3. Token has not been revoked
///
/// # Errors
/// `SessionError::{NotFound, Expired, Revoked}`, or `AppError::Storage` if the
/// lookup itself fails
pub async fn validate_refresh_token<S>(store: &S, token: &str) -> Result<RefreshTokenRecord, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let record = match store.get_refresh_token(token).await? {
        Some(record) => record,
        None => {
            tracing::warn!("Refresh token not found");
            return Err(SessionError::NotFound.into());
        }
    };

    if record.is_expired_at(Utc::now()) {
        tracing::info!(user_id = %record.user_id, "Refresh token expired");
        return Err(SessionError::Expired.into());
    }

    if record.is_revoked() {
        tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
        return Err(SessionError::Revoked.into());
    }

    Ok(record)
}

/// Revoke a refresh token
///
/// Idempotent: revoking an already revoked token succeeds and leaves the first
/// revocation time in place.
///
/// # Errors
/// `SessionError::NotFound` for an unknown token, `AppError::Storage` on I/O failure
pub async fn revoke_refresh_token<S>(store: &S, token: &str) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    if !store.revoke_refresh_token(token, Utc::now()).await? {
        return Err(SessionError::NotFound.into());
    }
    Ok(())
}
