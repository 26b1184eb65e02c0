//! Request extractors: bearer tokens and JSON bodies.

use std::convert::Infallible;

use async_trait::async_trait;
use auth::Claims;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use error::AuthError;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;
use crate::state::AppState;

/// A request carrying a valid `Authorization: Bearer <token>` header.
///
/// Rejects with 401 when the header is missing or the token does not verify.
#[derive(Debug, Clone)]
pub struct AuthenticatedStudent {
    pub student_id: String,
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedStudent {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let claims = state.tokens.verify_bearer(header).inspect_err(|e| {
            if matches!(e, AuthError::InvalidToken) {
                tracing::warn!("Invalid token presented to {}", parts.uri.path());
            }
        })?;
        let student_id = claims
            .student_id()
            .ok_or(AuthError::InvalidToken)?
            .to_string();

        Ok(Self { student_id, claims })
    }
}

/// Optional authentication: never rejects, yields `None` for guests.
#[derive(Debug, Clone)]
pub struct MaybeStudent(pub Option<AuthenticatedStudent>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeStudent {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(
            AuthenticatedStudent::from_request_parts(parts, state).await.ok(),
        ))
    }
}

/// JSON request body whose rejections use the API error body.
///
/// Malformed JSON, a wrong content type or missing fields answer 400
/// `VALIDATION_ERROR` instead of axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(ApiError::validation(rejection.body_text()))
            }
        }
    }
}
