//! Mapping of application errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use error::{AppError, AuthError, ErrorResponse, StorageError};

/// Handler error. Wraps [`AppError`] so it can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(AppError::Validation(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Auth(AuthError::InvalidToken | AuthError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Auth(AuthError::MissingIdentity) => StatusCode::BAD_REQUEST,
            AppError::Storage(StorageError::PathEscape) => StatusCode::FORBIDDEN,
            AppError::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::InvalidIdentity | StorageError::InvalidPath) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(StorageError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_internal() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        (self.status(), Json(ErrorResponse::from(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(AuthError::InvalidToken), StatusCode::UNAUTHORIZED),
            (ApiError::from(AuthError::Unauthorized), StatusCode::UNAUTHORIZED),
            (ApiError::from(StorageError::PathEscape), StatusCode::FORBIDDEN),
            (ApiError::from(StorageError::NotFound), StatusCode::NOT_FOUND),
            (ApiError::from(StorageError::InvalidPath), StatusCode::BAD_REQUEST),
            (
                ApiError::from(StorageError::TooLarge { limit: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (ApiError::validation("bad email"), StatusCode::BAD_REQUEST),
            (
                ApiError::from(StorageError::Io(std::io::Error::other("disk full"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(AuthError::TokenCreationFailed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{:?}", err);
        }
    }
}
