//! Sign-in, identity and sign-out.
//!
//! Tokens are stateless, so signing out is the client discarding its token.

use auth::{Claims, Plan};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use storage::sanitize_identity;

use crate::errors::ApiError;
use crate::extract::{ApiJson, MaybeStudent};
use crate::state::AppState;

const DEFAULT_NAME: &str = "Student";

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub name: String,
    pub student_id: String,
    pub plan: Plan,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MeResponse {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

/// Generate a student ID in the front end's `BN-XXXXXXXX` format.
fn new_student_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("BN-{}", id[..8].to_uppercase())
}

fn validate(req: AuthRequest) -> Result<(String, String, String, Plan), ApiError> {
    let email = req.email.trim().to_string();
    if email.len() < 5 || !email.contains('@') {
        return Err(ApiError::validation("Enter a real email"));
    }

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    let plan = match req.plan.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => p
            .parse::<Plan>()
            .map_err(|e| ApiError::validation(e.to_string()))?,
        None => Plan::default(),
    };

    let student_id = match req.student_id.map(|s| s.trim().to_string()) {
        Some(id) if !id.is_empty() => {
            if sanitize_identity(&id) != id {
                return Err(ApiError::validation(
                    "Student ID may only contain letters, digits, '-' and '_'",
                ));
            }
            id
        }
        _ => new_student_id(),
    };

    Ok((email, name, student_id, plan))
}

/// `POST /api/auth`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, name, student_id, plan) = validate(req)?;

    let claims = Claims::for_student(student_id.clone(), email.clone(), name.clone(), plan);
    let token = state.tokens.issue(&claims)?;
    tracing::info!("Issued token for student {} ({})", student_id, plan);

    Ok(Json(AuthResponse {
        token,
        email,
        name,
        student_id,
        plan,
    }))
}

/// `GET /api/me`. Guests and bad tokens get `logged_in: false`.
pub async fn me(MaybeStudent(student): MaybeStudent) -> Json<MeResponse> {
    let Some(student) = student else {
        return Json(MeResponse::default());
    };

    Json(MeResponse {
        logged_in: true,
        email: student.claims.email().map(str::to_string),
        name: student.claims.name().map(str::to_string),
        plan: Some(student.claims.plan()),
        student_id: Some(student.student_id),
    })
}

/// `POST /api/auth/logout`
pub async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str) -> AuthRequest {
        AuthRequest {
            email: email.to_string(),
            name: None,
            student_id: None,
            plan: None,
        }
    }

    #[test]
    fn test_defaults() {
        let (email, name, student_id, plan) = validate(request("  ada@example.com ")).unwrap();
        assert_eq!(email, "ada@example.com");
        assert_eq!(name, "Student");
        assert_eq!(plan, Plan::Associates);
        assert!(student_id.starts_with("BN-"));
        assert_eq!(student_id.len(), 11);
        assert_eq!(student_id, student_id.to_uppercase());
    }

    #[test]
    fn test_rejects_bad_email() {
        assert!(validate(request("a@b")).is_err());
        assert!(validate(request("not-an-email")).is_err());
    }

    #[test]
    fn test_plan_and_student_id() {
        let mut req = request("ada@example.com");
        req.plan = Some("MASTERS".to_string());
        req.student_id = Some("BN-TEST-123".to_string());
        let (_, _, student_id, plan) = validate(req).unwrap();
        assert_eq!(plan, Plan::Masters);
        assert_eq!(student_id, "BN-TEST-123");

        let mut req = request("ada@example.com");
        req.plan = Some("platinum".to_string());
        assert!(validate(req).is_err());

        let mut req = request("ada@example.com");
        req.student_id = Some("../admin".to_string());
        assert!(validate(req).is_err());
    }
}
