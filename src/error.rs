use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Business-rule and internal failures for the identity and follow-graph
/// core. Every variant maps to a stable status code and a human-readable
/// `{"message": ...}` body; only `Internal` hides its cause.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Email is in use")]
    Conflict,
    #[error("An account can not be found")]
    NotFound,
    #[error("You cannot follow yourself")]
    SelfFollow,
    #[error("User doesn't exist")]
    UnknownUser,
    #[error("You're already following this user")]
    AlreadyFollowing,
    #[error("You're not following this user, no need to unfollow")]
    NotFollowing,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("You cannot sign in through this provider")]
    CrossProviderConflict,
    #[error("This token has expired")]
    Expired,
    #[error("Your account has already been verified")]
    AlreadyVerified,
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::NotFound | ApiError::Expired => StatusCode::NOT_FOUND,
            ApiError::SelfFollow
            | ApiError::UnknownUser
            | ApiError::AlreadyFollowing
            | ApiError::NotFollowing
            | ApiError::InvalidCredentials
            | ApiError::CrossProviderConflict => StatusCode::BAD_REQUEST,
            ApiError::AlreadyVerified => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The cause of an Internal error stays in the logs; the client
        // only ever sees the generic message.
        let message = self.to_string();
        let body = Json(serde_json::json!({ "message": message }));
        (self.status(), body).into_response()
    }
}
