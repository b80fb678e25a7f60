//! REST API integration tests
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_signup() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignupRequest {
        display_name: Some("Mixed Case".to_string()),
        ..SignupRequest::unique("MixedCase")
    };

    let auth = server.signup(&request).await.unwrap();

    assert_eq!(auth.user.username, request.username.to_lowercase());
    assert_eq!(auth.user.display_name, "Mixed Case");
    assert!(!auth.user.online);
    assert!(!auth.token.is_empty());
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignupRequest::unique("dup");

    server.signup(&request).await.unwrap();

    let response = server.post("/api/auth/signup", &request).await.unwrap();
    let body: Value = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(body["error"]["code"], "USERNAME_TAKEN");
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/api/auth/signup", &json!({ "username": "nopassword" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post("/api/auth/signup", &json!({ "username": "", "password": "" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login() {
    let server = TestServer::start().await.expect("Failed to start server");
    let signup = SignupRequest::unique("login");
    let created = server.signup(&signup).await.unwrap();

    let response = server
        .post("/api/auth/login", &LoginRequest::from_signup(&signup))
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(auth.user.id, created.user.id);
    assert!(!auth.token.is_empty());
    // Logging in does not make anyone online
    assert!(!auth.user.online);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = TestServer::start().await.expect("Failed to start server");
    let signup = SignupRequest::unique("wrongpw");
    server.signup(&signup).await.unwrap();

    let response = server
        .post(
            "/api/auth/login",
            &LoginRequest {
                username: signup.username.clone(),
                password: "not-the-password".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post(
            "/api/auth/login",
            &LoginRequest {
                username: "nobody-here".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// History Tests
// ============================================================================

#[tokio::test]
async fn test_history_requires_token() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/messages/room/global").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .get_auth("/api/messages/room/global", "not-a-token")
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_room_history_oldest_first_with_sender() {
    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.signup_unique("histalice").await.unwrap();

    let mut ws = server.connect(&alice.token).await.unwrap();
    for text in ["first", "second", "third"] {
        ws.send_event("room_message", json!({ "room": "global", "text": text }))
            .await
            .unwrap();
        ws.wait_for("room_message").await.unwrap();
    }

    let response = server
        .get_auth("/api/messages/room/global", &alice.token)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
    for message in &messages {
        assert_eq!(message.sender.id, alice.user.id);
        assert_eq!(message.sender.username, alice.user.username);
        assert_eq!(message.room.as_deref(), Some("global"));
    }

    // A limited page keeps the newest messages, still oldest-first
    let response = server
        .get_auth("/api/messages/room/global?limit=2", &alice.token)
        .await
        .unwrap();
    let page: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    let texts: Vec<&str> = page.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["second", "third"]);
}

#[tokio::test]
async fn test_private_history_between_two_users() {
    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.signup_unique("pvalice").await.unwrap();
    let bob = server.signup_unique("pvbob").await.unwrap();
    let carol = server.signup_unique("pvcarol").await.unwrap();

    let mut ws = server.connect(&alice.token).await.unwrap();
    ws.send_event(
        "private_message",
        json!({ "toUserId": bob.user.id, "text": "hi bob" }),
    )
    .await
    .unwrap();
    ws.wait_for("private_message").await.unwrap();
    ws.send_event(
        "private_message",
        json!({ "toUserId": carol.user.id, "text": "hi carol" }),
    )
    .await
    .unwrap();
    ws.wait_for("private_message").await.unwrap();

    // Bob sees only his conversation with Alice
    let response = server
        .get_auth(&format!("/api/messages/private/{}", alice.user.id), &bob.token)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "hi bob");
    assert_eq!(messages[0].sender.id, alice.user.id);
    assert!(messages[0].room.is_none());

    let response = server
        .get_auth("/api/messages/private/not-a-user-id", &bob.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}
