//! Common error types for the Botnology services.
//!
//! Every crate in the workspace reports failures through these types so the
//! HTTP layer can map them onto response states in one place.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication-related errors.
///
/// `InvalidToken` covers every way a presented token can be bad. Callers never
/// learn whether decoding, parsing or the signature check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token payload is missing the identity claim")]
    MissingIdentity,

    #[error("Token creation failed")]
    TokenCreationFailed,
}

/// Student storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Path escapes the student storage root")]
    PathEscape,

    #[error("File not found")]
    NotFound,

    #[error("Student identifier has no usable characters")]
    InvalidIdentity,

    #[error("Invalid storage path")]
    InvalidPath,

    #[error("Content exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Generic server-side failure. Carries nothing about the cause.
    pub fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        let (code, message) = match err {
            AuthError::InvalidToken => ("AUTH_INVALID_TOKEN", "Invalid token"),
            AuthError::Unauthorized => ("AUTH_UNAUTHORIZED", "Unauthorized"),
            AuthError::MissingIdentity => ("AUTH_MISSING_IDENTITY", "Missing student identifier"),
            AuthError::TokenCreationFailed => return Self::internal(),
        };
        Self::new(code, message)
    }
}

impl From<&StorageError> for ErrorResponse {
    fn from(err: &StorageError) -> Self {
        let (code, message) = match err {
            StorageError::PathEscape => ("STORAGE_PATH_ESCAPE", "Path is outside student storage"),
            StorageError::NotFound => ("STORAGE_NOT_FOUND", "File not found"),
            StorageError::InvalidIdentity => ("STORAGE_INVALID_IDENTITY", "Invalid student identifier"),
            StorageError::InvalidPath => ("STORAGE_INVALID_PATH", "Invalid storage path"),
            StorageError::TooLarge { limit } => {
                return Self::new("STORAGE_TOO_LARGE", "Content too large")
                    .with_details(format!("limit is {} bytes", limit));
            }
            // I/O failures may mention host paths; never forward them.
            StorageError::Io(_) => return Self::internal(),
        };
        Self::new(code, message)
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Auth(e) => e.into(),
            AppError::Storage(e) => e.into(),
            AppError::Validation(msg) => Self::new("VALIDATION_ERROR", msg.clone()),
            AppError::Internal(_) => Self::internal(),
        }
    }
}

impl AppError {
    /// True for failures the caller cannot fix (they surface as a generic 500).
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Internal(_)
                | AppError::Auth(AuthError::TokenCreationFailed)
                | AppError::Storage(StorageError::Io(_))
        )
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
