use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use atelier_auth::router::build_router;

use crate::helpers::{SentHandle, build_state, last_delivered_code, test_settings};

fn test_server() -> (TestServer, SentHandle) {
    let (state, sent) = build_state(test_settings());
    let server = TestServer::new(build_router(state)).expect("router should build");
    (server, sent)
}

#[tokio::test]
async fn should_report_healthy() {
    let (server, _sent) = test_server();
    assert_eq!(server.get("/healthz").await.status_code(), StatusCode::OK);
    assert_eq!(server.get("/readyz").await.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_complete_the_full_sign_in_journey() {
    let (server, sent) = test_server();

    // Request a code.
    let res = server
        .post("/auth/code")
        .json(&json!({"email": "a@x.com"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    let body: Value = res.json();
    assert_eq!(body["expiresInMinutes"], 10);
    assert_eq!(body["cooldownSeconds"], 60);

    // Log in with the delivered code.
    let code = last_delivered_code(&sent);
    let res = server
        .post("/auth/token")
        .json(&json!({"email": "a@x.com", "code": code}))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    let body: Value = res.json();
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"]["lastLoginAt"].is_string());
    let access_token = body["tokens"]["accessToken"].as_str().unwrap().to_owned();
    let refresh_token = body["tokens"]["refreshToken"].as_str().unwrap().to_owned();

    // The access token authorizes the profile lookup.
    let res = server
        .get("/auth/profile")
        .authorization_bearer(&access_token)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body: Value = res.json();
    assert_eq!(body["email"], "a@x.com");
    assert!(body["createdAt"].is_string());

    // A refresh token does not pass where an access token is expected.
    let res = server
        .get("/auth/profile")
        .authorization_bearer(&refresh_token)
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json();
    assert_eq!(body["kind"], "TOKEN_INVALID");

    // Rotate the session.
    let res = server
        .patch("/auth/token")
        .json(&json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body: Value = res.json();
    let rotated = body["refreshToken"].as_str().unwrap().to_owned();
    assert_ne!(rotated, refresh_token);

    // The rotated-away token is dead.
    let res = server
        .patch("/auth/token")
        .json(&json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json();
    assert_eq!(body["kind"], "TOKEN_INVALID");

    // Log out, then the rotated token is dead too.
    let res = server
        .delete("/auth/token")
        .json(&json!({"refreshToken": rotated}))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    let res = server
        .patch("/auth/token")
        .json(&json!({"refreshToken": rotated}))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_surface_structured_errors() {
    let (server, _sent) = test_server();

    // Verification without a requested code.
    let res = server
        .post("/auth/token")
        .json(&json!({"email": "nobody@x.com", "code": "123456"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    let body: Value = res.json();
    assert_eq!(body["kind"], "OTP_NOT_FOUND");
    assert!(body["message"].is_string());

    // Immediate resend trips the cooldown.
    server
        .post("/auth/code")
        .json(&json!({"email": "a@x.com"}))
        .await;
    let res = server
        .post("/auth/code")
        .json(&json!({"email": "a@x.com"}))
        .await;
    assert_eq!(res.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = res.json();
    assert_eq!(body["kind"], "OTP_COOLDOWN_ACTIVE");
}

#[tokio::test]
async fn should_accept_tokenless_logout() {
    let (server, _sent) = test_server();
    let res = server.delete("/auth/token").json(&json!({})).await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
}
