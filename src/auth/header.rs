/// Authorization header parsing
///
/// Pulls the credential out of `Authorization: <Scheme> <credential>`. The
/// scheme is matched case-sensitively with exactly one space, and the
/// credential is returned verbatim.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::HeaderError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`
///
/// # Errors
/// * `HeaderError::Missing` - no Authorization header
/// * `HeaderError::Malformed` - repeated header, non-text value, wrong scheme
///   or empty token
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, HeaderError> {
    extract_credential(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, HeaderError> {
    extract_credential(headers, API_KEY_PREFIX)
}

fn extract_credential(headers: &HeaderMap, prefix: &str) -> Result<String, HeaderError> {
    let mut values = headers.get_all(AUTHORIZATION);
    let value = values.next().ok_or(HeaderError::Missing)?;
    if values.next().is_some() {
        return Err(HeaderError::Malformed);
    }

    let value = value.to_str().map_err(|_| HeaderError::Malformed)?;
    strip_scheme(value, prefix).map(str::to_string)
}

fn strip_scheme<'a>(value: &'a str, prefix: &str) -> Result<&'a str, HeaderError> {
    match value.strip_prefix(prefix) {
        Some(credential) if !credential.is_empty() => Ok(credential),
        _ => Err(HeaderError::Malformed),
    }
}
