/// Application Error Handling
///
/// This module provides the error system shared by every layer of the service.
/// It covers:
/// 1. Domain-Specific Error Types (one family per concern)
/// 2. The unified `AppError` used for control flow
/// 3. HTTP Response Mapping (status, public code, public message)
/// 4. Structured Error Logging with Context
///
/// Every authentication failure kind keeps its own variant so it can be logged,
/// but all of them share one public response.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for request input
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("{0} contains suspicious content")]
    SuspiciousContent(String),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Password credential errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password does not match")]
    Mismatch,
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Access token (signed JWT) errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("access token is malformed: {0}")]
    Malformed(String),
    #[error("access token has expired")]
    Expired,
    #[error("access token signature is invalid")]
    InvalidSignature,
    #[error("access token signing failed: {0}")]
    Signing(String),
}

/// Refresh token (stored session) errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token has expired")]
    Expired,
    #[error("refresh token has been revoked")]
    Revoked,
}

/// Authorization header errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("authorization header is missing")]
    Missing,
    #[error("authorization header is malformed")]
    Malformed,
    #[error("api key does not match")]
    KeyMismatch,
}

/// Persistence errors, passed through from the storage adapter
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Duplicate entry: {0}")]
    UniqueConstraintViolation(String),
    #[error("Query error: {0}")]
    QueryExecution(String),
    #[error("Database connection error: {0}")]
    ConnectionPool(String),
    #[error("Storage error: {0}")]
    Unexpected(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StorageError::UniqueConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::ConnectionPool(err.to_string())
            }
            sqlx::Error::Database(_) | sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StorageError::QueryExecution(err.to_string())
            }
            _ => StorageError::Unexpected(err.to_string()),
        }
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("account not found")]
    AccountNotFound,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for every failure that must surface as a bare 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AppError::Token(TokenError::Malformed(_))
                | AppError::Token(TokenError::Expired)
                | AppError::Token(TokenError::InvalidSignature)
                | AppError::Session(_)
                | AppError::Header(_)
        )
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Maps an error to what the caller is allowed to see.
///
/// Token, session and header failures all land on the same row, so a client
/// cannot tell a forged token from an expired, revoked or unknown one.
fn classify(error: &AppError) -> (StatusCode, &'static str, String) {
    if error.is_unauthorized() {
        return (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Unauthorized".to_string(),
        );
    }

    match error {
        AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
        AppError::Credential(CredentialError::Mismatch)
        | AppError::Credential(CredentialError::Malformed(_)) => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Incorrect email or password".to_string(),
        ),
        AppError::AccountNotFound => (
            StatusCode::NOT_FOUND,
            "ACCOUNT_NOT_FOUND",
            "User not found".to_string(),
        ),
        AppError::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{} not found", what)),
        AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        AppError::Storage(StorageError::UniqueConstraintViolation(_)) => (
            StatusCode::CONFLICT,
            "DUPLICATE_ENTRY",
            "Resource already exists".to_string(),
        ),
        AppError::Storage(StorageError::ConnectionPool(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database service temporarily unavailable".to_string(),
        ),
        AppError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "Database error occurred".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error".to_string(),
        ),
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = classify(self);
        let response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );
        (status, response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Token(TokenError::Signing(_)) | AppError::Credential(CredentialError::Hashing(_)) => {
                tracing::error!(request_id = request_id, error = %self, "Credential machinery failure");
            }
            AppError::Credential(CredentialError::Malformed(_)) => {
                tracing::error!(request_id = request_id, error = %self, "Stored password hash is unreadable");
            }
            AppError::Credential(_) | AppError::AccountNotFound => {
                tracing::warn!(request_id = request_id, error = %self, "Invalid credentials attempt");
            }
            AppError::Token(_) | AppError::Session(_) | AppError::Header(_) => {
                tracing::warn!(request_id = request_id, cause = %self, "Authentication error");
            }
            AppError::Storage(StorageError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Storage(e) => {
                tracing::error!(request_id = request_id, error = %e, "Storage error");
            }
            AppError::NotFound(_) | AppError::Forbidden(_) => {
                tracing::info!(request_id = request_id, error = %self, "Request rejected");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        classify(self).0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Error context for enhanced logging and debugging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Logs `error` with this context attached and hands it back for `?`.
    pub fn record(&self, error: AppError) -> AppError {
        let context = serde_json::json!({
            "request_id": self.request_id,
            "operation": self.operation,
            "user_id": self.user_id,
            "timestamp": self.timestamp.to_rfc3339(),
        });

        if matches!(error, AppError::Storage(_) | AppError::Internal(_)) {
            tracing::error!(error = %error, context = %context, "Operation failed");
        } else {
            tracing::warn!(error = %error, context = %context, "Operation rejected");
        }
        error
    }
}
