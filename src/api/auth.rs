//! Bearer-token authentication boundary
//!
//! Routes never parse raw tokens themselves; this extractor verifies the
//! session token and injects the acting account id.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::AppState;
use crate::account::AccountId;

/// The acting account id, proven by a valid bearer session token.
pub struct AuthUser(pub AccountId);

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

pub fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(parts) else {
            return Err(unauthorized("Missing bearer token"));
        };

        match state.accounts.credentials().verify_session_token(&token) {
            Ok(account_id) => Ok(AuthUser(account_id)),
            Err(_) => Err(unauthorized("Invalid token")),
        }
    }
}
