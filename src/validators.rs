/// Input validators - turn raw request fields into typed, checked values
/// Features:
/// 1. Email validation (format, length, suspicious patterns)
/// 2. Password bounds (bcrypt input limit)
/// 3. Chirp body rules (length limit, profanity replacement)
///
/// Nothing reaches the session or storage layer without passing through here.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::MAX_PASSWORD_BYTES;
use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64;
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANITIES: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// A syntactically valid, trimmed email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn parse(email: &str) -> Result<Self, ValidationError> {
        let trimmed = email.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("email".into()));
        }
        if trimmed.len() < MIN_EMAIL_LENGTH {
            return Err(ValidationError::TooShort("email".into(), MIN_EMAIL_LENGTH));
        }
        if trimmed.len() > MAX_EMAIL_LENGTH {
            return Err(ValidationError::TooLong("email".into(), MAX_EMAIL_LENGTH));
        }
        if !EMAIL_REGEX.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat("email".into()));
        }
        if has_suspicious_email_patterns(trimmed) {
            return Err(ValidationError::SuspiciousContent("email".into()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for UserEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A plaintext password that bcrypt can hash without truncation
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn parse(password: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::EmptyField("password".into()));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(ValidationError::TooLong("password".into(), MAX_PASSWORD_BYTES));
        }
        Ok(Self(password.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Email and password as submitted for login, signup or account update
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: UserEmail,
    pub password: Password,
}

impl Credentials {
    pub fn parse(email: &str, password: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            email: UserEmail::parse(email)?,
            password: Password::parse(password)?,
        })
    }
}

/// A chirp body within the length limit, with profanity replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChirpBody(String);

impl ChirpBody {
    pub fn parse(body: &str) -> Result<Self, ValidationError> {
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyField("body".into()));
        }
        if body.chars().count() > MAX_CHIRP_LENGTH {
            return Err(ValidationError::TooLong("body".into(), MAX_CHIRP_LENGTH));
        }
        Ok(Self(filter_profanity(body)))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Replace banned words (whole words, any case) with `****`.
///
/// Words are split on whitespace and re-joined with single spaces.
pub fn filter_profanity(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            let lowered = word.to_lowercase();
            if PROFANITIES.contains(&lowered.as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detects suspicious patterns in email addresses that might indicate phishing
fn has_suspicious_email_patterns(email: &str) -> bool {
    if let Some(at_pos) = email.find('@') {
        if email[..at_pos].len() > MAX_LOCAL_PART_LENGTH {
            return true;
        }
    }

    email.matches('@').count() != 1 || email.contains('\0')
}
