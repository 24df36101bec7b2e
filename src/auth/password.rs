/// Password Hashing and Verification
///
/// One-way bcrypt digests. Each digest embeds its algorithm version, cost and a
/// fresh random salt, so hashing the same password twice yields two different
/// strings that both verify.

use bcrypt::{hash, verify};

use crate::error::CredentialError;

pub const MIN_PASSWORD_COST: u32 = 4;
pub const MAX_PASSWORD_COST: u32 = 31;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
///
/// # Arguments
/// * `password` - Plain text password to hash
/// * `cost` - bcrypt cost factor, fixed for the process by configuration
///
/// # Errors
/// Returns `CredentialError::Hashing` if the input is longer than bcrypt can
/// represent or the primitive itself fails.
pub fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(CredentialError::Hashing(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    hash(password, cost).map_err(|e| CredentialError::Hashing(e.to_string()))
}

/// Verify a password against its digest
///
/// The comparison inside bcrypt is constant-time. A digest that cannot be
/// parsed is reported as `Malformed`, never as a panic.
///
/// # Errors
/// * `CredentialError::Mismatch` - the password is wrong
/// * `CredentialError::Malformed` - the stored digest is not a bcrypt hash
pub fn verify_password(password: &str, digest: &str) -> Result<(), CredentialError> {
    match verify(password, digest) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CredentialError::Mismatch),
        Err(e) => Err(CredentialError::Malformed(e.to_string())),
    }
}
