// Request/response shapes for the JSON API
use serde::Deserialize;

use crate::account::AccountId;

#[derive(Deserialize, Debug)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Provider-callback payload for federated sign-in.
#[derive(Deserialize, Debug)]
pub struct SocialRequest {
    pub provider: String,
    pub email: String,
    /// Provider-supplied secret standing in for a password.
    pub secret: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Deserialize, Debug)]
pub struct ForgotPasswordQuery {
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct ResetTokenQuery {
    pub token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub password: String,
    #[allow(dead_code)]
    pub confirm_password: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: AccountId,
}
