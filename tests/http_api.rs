//! End-to-end tests driving the router straight through tower

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use inkpress::api::{router, AppState};
use inkpress::config::AppConfig;
use inkpress::mailer::{MailTransport, Mailer, OutboundMail};

/// Captures outbound mail so tests can fish tokens out of message bodies.
struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutboundMail>>>,
}

#[async_trait::async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, mail: OutboundMail) -> Result<(), String> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.token_secret = "integration-test-secret".to_string();
    config.auth.expose_reset_tokens = true;
    config
}

fn test_app() -> (Router, Arc<Mutex<Vec<OutboundMail>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mailer = Mailer::spawn(RecordingTransport { sent: sent.clone() });
    let state = AppState::new(&test_config(), mailer);
    (router(state), sent)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn signup(app: &Router, first: &str, last: &str, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "firstname": first,
            "lastname": last,
            "email": email,
            "password": password,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body
}

#[tokio::test]
async fn signup_signin_scenario() {
    let (app, _) = test_app();

    let body = signup(&app, "Jane", "Doe", "jane@doegirl.com", "myPassword").await;
    assert!(body["token"].is_string());
    assert!(body["userId"].is_number());

    // Same email again, case changed, still a conflict.
    let (status, body) = send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "firstname": "Jane",
            "lastname": "Doe",
            "email": "Jane@Doegirl.com",
            "password": "myPassword",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email is in use");

    let (status, body) = send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "jane@doegirl.com", "password": "wrongpw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect email or password");

    let (status, body) = send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "jane@doegirl.com", "password": "myPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn signin_unknown_email_is_bad_request() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "nobody@doegirl.com", "password": "myPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The account with this email does not exist");
}

#[tokio::test]
async fn signup_validation_messages() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "firstname": "", "lastname": "", "email": "", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Please fill the firstname, lastname, email, and password fields"
    );

    let (status, body) = send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "firstname": "Jane",
            "lastname": "Doe",
            "email": "jane@doegirl.com",
            "password": "myPassword",
            "occupation": "Software developer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Too many fields");
}

#[tokio::test]
async fn follow_unfollow_scenario() {
    let (app, _) = test_app();

    let a = signup(&app, "Alice", "Archer", "alice@example.com", "password1").await;
    let b = signup(&app, "Bob", "Barker", "bob@example.com", "password2").await;
    let token = a["token"].as_str().unwrap().to_string();
    let b_id = b["userId"].as_u64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/user/follow",
        Some(&token),
        Some(json!({ "userId": b_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User Bob Barker followed successfully");

    let (status, body) = send(
        &app,
        "POST",
        "/user/follow",
        Some(&token),
        Some(json!({ "userId": b_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You're already following this user");

    let (status, _) = send(
        &app,
        "POST",
        "/user/unfollow",
        Some(&token),
        Some(json!({ "userId": b_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/user/unfollow",
        Some(&token),
        Some(json!({ "userId": b_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "You're not following this user, no need to unfollow"
    );
}

#[tokio::test]
async fn follow_rejects_self_and_unknown() {
    let (app, _) = test_app();
    let a = signup(&app, "Alice", "Archer", "alice@example.com", "password1").await;
    let token = a["token"].as_str().unwrap().to_string();
    let a_id = a["userId"].as_u64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/user/follow",
        Some(&token),
        Some(json!({ "userId": a_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot follow yourself");

    let (status, body) = send(
        &app,
        "POST",
        "/user/follow",
        Some(&token),
        Some(json!({ "userId": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User doesn't exist");
}

#[tokio::test]
async fn listings_and_stats() {
    let (app, _) = test_app();

    let a = signup(&app, "Alice", "Archer", "alice@example.com", "password1").await;
    let b = signup(&app, "Bob", "Barker", "bob@example.com", "password2").await;
    let a_token = a["token"].as_str().unwrap().to_string();
    let b_token = b["token"].as_str().unwrap().to_string();
    let a_id = a["userId"].as_u64().unwrap();
    let b_id = b["userId"].as_u64().unwrap();

    send(&app, "POST", "/user/follow", Some(&a_token), Some(json!({ "userId": b_id }))).await;
    send(&app, "POST", "/user/follow", Some(&b_token), Some(json!({ "userId": a_id }))).await;

    let (status, body) = send(&app, "GET", "/user/followed", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["email"], "bob@example.com");
    // The public profile never leaks credentials.
    assert!(body["data"][0].get("passwordHash").is_none());

    let (status, body) = send(&app, "GET", "/user/followers", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["email"], "bob@example.com");

    let (status, body) = send(&app, "GET", "/user/stats", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["followers"], 1);
    assert_eq!(body["data"]["following"], 1);
    assert_eq!(body["data"]["articlesPublished"], 0);
}

#[tokio::test]
async fn authenticated_routes_require_bearer_token() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "GET", "/user/followed", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing bearer token");

    let (status, body) = send(&app, "GET", "/user/followed", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn verification_is_one_shot_over_http() {
    let (app, sent) = test_app();

    signup(&app, "Jane", "Doe", "jane@doegirl.com", "myPassword").await;

    // Pull the verification token out of the captured mail.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let token = {
        let sent = sent.lock().unwrap();
        let mail = sent.iter().find(|m| m.to == "jane@doegirl.com").unwrap();
        mail.body
            .split("/auth/verify/")
            .nth(1)
            .unwrap()
            .split_whitespace()
            .next()
            .unwrap()
            .to_string()
    };

    let (status, body) = send(&app, "GET", &format!("/auth/verify/{}", token), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account verified successfully");

    let (status, body) = send(&app, "GET", &format!("/auth/verify/{}", token), None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Your account has already been verified");
}

#[tokio::test]
async fn password_reset_flow_over_http() {
    let (app, _) = test_app();

    signup(&app, "Jane", "Doe", "jane@doegirl.com", "myPassword").await;

    let (status, body) = send(
        &app,
        "GET",
        "/auth/forgotPassword?email=jane@doegirl.com",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/auth/resetPassword?token={}", token),
        None,
        Some(json!({ "password": "newPassword", "confirm_password": "newPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successful");

    // The consumed token now answers like one that never existed.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/auth/resetPassword?token={}", token),
        None,
        Some(json!({ "password": "another1", "confirm_password": "another1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "jane@doegirl.com", "password": "myPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "jane@doegirl.com", "password": "newPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn forgot_password_unknown_email_is_not_found() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        "GET",
        "/auth/forgotPassword?email=nobody@doegirl.com",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn social_sign_in_creates_then_merges() {
    let (app, _) = test_app();

    let payload = json!({
        "provider": "google",
        "email": "dev@gmail.com",
        "secret": "provider-secret",
        "firstname": "Dev",
        "lastname": "Eloper",
    });

    let (status, first) = send(&app, "POST", "/auth/social", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = send(&app, "POST", "/auth/social", None, Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["userId"], second["userId"]);

    // Same email through a different secret is a cross-provider conflict.
    let (status, body) = send(
        &app,
        "POST",
        "/auth/social",
        None,
        Some(json!({
            "provider": "twitter",
            "email": "dev@gmail.com",
            "secret": "other-secret",
            "firstname": "Dev",
            "lastname": "Eloper",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot sign in through this provider");
}
