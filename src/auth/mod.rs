/// Authentication module
///
/// Password hashing, access token (JWT) issuance/validation, refresh token
/// lifecycle, Authorization header parsing and the session coordinator that
/// ties them together.

mod claims;
mod extractor;
mod header;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::{Claims, ISSUER};
pub use extractor::AuthenticatedUser;
pub use header::{extract_api_key, extract_bearer_token};
pub use jwt::{issue_access_token, verify_access_token};
pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES, MAX_PASSWORD_COST, MIN_PASSWORD_COST};
pub use refresh_token::{
    generate_refresh_token, hash_refresh_token, issue_refresh_token, revoke_refresh_token,
    validate_refresh_token,
};
pub use session::{LoginOutcome, SessionCoordinator};
