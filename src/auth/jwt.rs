/// JWT Token Generation and Validation
///
/// Access tokens are stateless: nothing is stored, and validity is decided
/// entirely by the HS256 signature and the timestamps at verification time.
/// They cannot be revoked early, which is why their lifetime stays short.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::TokenError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issue a signed access token for a user
///
/// # Arguments
/// * `user_id` - Identity asserted by the token
/// * `secret` - Symmetric signing secret
/// * `lifetime` - Time until `exp`; may be negative
///
/// # Errors
/// Returns `TokenError::Signing` if encoding fails
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    lifetime: Duration,
) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, lifetime);

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Validate an access token and return the user it speaks for
///
/// Only HS256 is accepted: a token whose header names any other algorithm is
/// rejected before its signature is looked at.
///
/// # Errors
/// * `TokenError::InvalidSignature` - wrong secret, wrong algorithm or foreign issuer
/// * `TokenError::Expired` - `now >= exp`
/// * `TokenError::Malformed` - not a JWT, missing claims, or a subject that is not a UUID
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["sub", "iss", "iat", "exp"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidIssuer => {
            TokenError::InvalidSignature
        }
        _ => TokenError::Malformed(e.to_string()),
    })?;

    // jsonwebtoken accepts exp == now; this service does not.
    if claims.is_expired() {
        return Err(TokenError::Expired);
    }

    claims.user_id()
}
