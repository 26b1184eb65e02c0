//! Per-student file storage endpoints.
//!
//! The student is always taken from the verified token, never from the body.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::extract::{ApiJson, AuthenticatedStudent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedResponse {
    pub saved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// `POST /api/storage/write`
pub async fn write_file(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
    ApiJson(req): ApiJson<WriteRequest>,
) -> Result<Json<SavedResponse>, ApiError> {
    state
        .storage
        .write(&student.student_id, &req.path, &req.content)
        .await?;
    Ok(Json(SavedResponse { saved: true }))
}

/// `POST /api/storage/read`
pub async fn read_file(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
    ApiJson(req): ApiJson<PathRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    let content = state.storage.read(&student.student_id, &req.path).await?;
    Ok(Json(ContentResponse { content }))
}

/// `GET /api/storage/list`
pub async fn list_files(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
) -> Result<Json<FilesResponse>, ApiError> {
    let files = state.storage.list(&student.student_id).await?;
    Ok(Json(FilesResponse { files }))
}

/// `POST /api/storage/delete`
pub async fn delete_file(
    State(state): State<AppState>,
    student: AuthenticatedStudent,
    ApiJson(req): ApiJson<PathRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.storage.delete(&student.student_id, &req.path).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
