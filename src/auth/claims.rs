/// JWT Claims structure
///
/// Payload of an access token: who it speaks for, who issued it, and the
/// window in which it is valid (RFC 7519 registered claims).

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Issuer of every access token minted by this service
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token ID, distinguishes tokens minted in the same second
    pub jti: String,
}

impl Claims {
    /// Create claims for `user_id` valid for `lifetime` from now.
    ///
    /// A negative lifetime yields claims that are already expired.
    pub fn new(user_id: Uuid, lifetime: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime.num_seconds()),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `TokenError::Malformed` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| TokenError::Malformed("subject is not a user id".to_string()))
    }

    /// No grace period: a token is dead the second `exp` is reached.
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.exp
    }
}
