//! HTTP JSON handlers for the identity and follow-graph API

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::auth::AuthUser;
use super::types::*;
use super::AppState;
use crate::account::AccountOrigin;
use crate::error::ApiError;
use crate::validation::validate_payload;

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn bad_request(message: &str) -> Response {
    reply(StatusCode::BAD_REQUEST, json!({ "message": message }))
}

fn parse<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|_| ApiError::Internal("malformed payload".to_string()))
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    if let Err(message) = validate_payload("signup", &payload) {
        return Ok(bad_request(&message));
    }
    let req: SignupRequest = parse(payload)?;

    let outcome = state
        .accounts
        .signup(&req.firstname, &req.lastname, &req.email, &req.password)?;

    Ok(reply(
        StatusCode::CREATED,
        json!({
            "token": outcome.token,
            "userId": outcome.account_id,
            "message": "Successfully created your account",
        }),
    ))
}

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    if let Err(message) = validate_payload("signin", &payload) {
        return Ok(bad_request(&message));
    }
    let req: SigninRequest = parse(payload)?;

    match state.accounts.signin(&req.email, &req.password) {
        Ok(outcome) => Ok(reply(
            StatusCode::OK,
            json!({
                "token": outcome.token,
                "message": "Successfully signed in",
            }),
        )),
        // The endpoint contract answers 400 here, not 404.
        Err(ApiError::NotFound) => {
            Ok(bad_request("The account with this email does not exist"))
        }
        Err(e) => Err(e),
    }
}

/// POST /auth/social — federated provider callback.
pub async fn social(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    if let Err(message) = validate_payload("social", &payload) {
        return Ok(bad_request(&message));
    }
    let req: SocialRequest = parse(payload)?;

    let origin = match req.provider.as_str() {
        "google" => AccountOrigin::Google,
        "facebook" => AccountOrigin::Facebook,
        "twitter" => AccountOrigin::Twitter,
        _ => return Ok(bad_request("Unknown provider")),
    };

    let outcome = state.accounts.federated_sign_in(
        &req.email,
        &req.secret,
        &req.firstname,
        &req.lastname,
        origin,
    )?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(reply(
        status,
        json!({
            "token": outcome.token,
            "userId": outcome.account_id,
            "message": if outcome.created {
                "Successfully created your account"
            } else {
                "Successfully signed in"
            },
        }),
    ))
}

/// GET /auth/forgotPassword?email=...
pub async fn forgot_password(
    State(state): State<AppState>,
    Query(query): Query<ForgotPasswordQuery>,
) -> Result<Response, ApiError> {
    let issued = state.accounts.request_password_reset(&query.email)?;

    let mut body = json!({ "message": "A reset link has been sent to your email" });
    // Raw token in the body is a debug affordance; the real delivery
    // channel is the reset mail.
    if state.accounts.expose_reset_tokens() {
        body["token"] = json!(issued.token);
    }
    Ok(reply(StatusCode::OK, body))
}

/// POST /auth/resetPassword?token=...
pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<ResetTokenQuery>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    // Token resolution is the precondition step: unknown and expired
    // tokens answer identically before the body is even considered.
    let token = query.token.ok_or(ApiError::NotFound)?;
    let account_id = state.accounts.resolve_reset_token(&token)?;

    if let Err(message) = validate_payload("resetPassword", &payload) {
        return Ok(bad_request(&message));
    }
    let req: ResetPasswordRequest = parse(payload)?;

    state.accounts.reset_password(account_id, &req.password)?;
    Ok(reply(
        StatusCode::OK,
        json!({ "message": "Password reset successful" }),
    ))
}

/// GET /auth/verify/:token
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    state.accounts.verify_account(&token)?;
    Ok(reply(
        StatusCode::OK,
        json!({ "message": "Account verified successfully" }),
    ))
}

/// POST /user/follow
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(follower): AuthUser,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    if let Err(message) = validate_payload("follow", &payload) {
        return Ok(bad_request(&message));
    }
    let req: FollowRequest = parse(payload)?;

    // Store before graph, always in that order.
    let store = state.lock_store()?;
    let mut graph = state.lock_graph()?;
    let name = graph.follow(&store, follower, req.user_id)?;

    Ok(reply(
        StatusCode::CREATED,
        json!({ "message": format!("User {} followed successfully", name) }),
    ))
}

/// POST /user/unfollow
pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(follower): AuthUser,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    if let Err(message) = validate_payload("unfollow", &payload) {
        return Ok(bad_request(&message));
    }
    let req: FollowRequest = parse(payload)?;

    let store = state.lock_store()?;
    let mut graph = state.lock_graph()?;
    let name = graph.unfollow(&store, follower, req.user_id)?;

    Ok(reply(
        StatusCode::CREATED,
        json!({ "message": format!("User {} unfollowed successfully", name) }),
    ))
}

/// GET /user/followed
pub async fn followed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let store = state.lock_store()?;
    let graph = state.lock_graph()?;
    let listing = graph.list_followed(&store, user)?;

    Ok(reply(
        StatusCode::OK,
        json!({
            "data": listing.data,
            "count": listing.count,
            "message": "Retrieved followed users",
        }),
    ))
}

/// GET /user/followers
pub async fn followers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let store = state.lock_store()?;
    let graph = state.lock_graph()?;
    let listing = graph.list_followers(&store, user)?;

    Ok(reply(
        StatusCode::OK,
        json!({
            "data": listing.data,
            "count": listing.count,
            "message": "Retrieved followers",
        }),
    ))
}

/// GET /user/stats
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let stats = state.stats.my_stats(user)?;
    Ok(reply(
        StatusCode::OK,
        json!({
            "data": stats,
            "message": "Retrieved your stats",
        }),
    ))
}
