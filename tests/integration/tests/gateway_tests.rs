//! WebSocket gateway integration tests
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use chat_common::GatewayConfig;
use integration_tests::{fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

const QUIET: Duration = Duration::from_millis(300);

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_ready_lists_default_room() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("ready").await.unwrap();

    let ws = server.connect(&alice.token).await.unwrap();

    assert_eq!(ws.ready["user"]["id"], alice.user.id.as_str());
    assert_eq!(ws.ready["rooms"], json!(["global"]));
    assert!(ws.ready["connectionId"].is_string());
}

#[tokio::test]
async fn test_bad_token_is_rejected_before_upgrade() {
    let server = TestServer::start().await.unwrap();

    let status = server
        .rejected_handshake(&server.gateway_url("garbage"))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let missing = format!("ws://{}/gateway", server.gateway_addr);
    let status = server.rejected_handshake(&missing).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_presence_transitions_once_per_user() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("watcher").await.unwrap();
    let bob = server.signup_unique("tabs").await.unwrap();

    let mut watcher = server.connect_online(&alice).await.unwrap();

    // First tab brings Bob online
    let tab1 = server.connect_online(&bob).await.unwrap();
    let online = watcher.expect_event("user_online").await.unwrap();
    assert_eq!(online["userId"], bob.user.id.as_str());
    assert_eq!(online["username"], bob.user.username.as_str());

    // Second tab is silent; the next thing Alice sees is Bob's message
    let mut tab2 = server.connect(&bob.token).await.unwrap();
    tab2.send_event("room_message", json!({ "room": "global", "text": "two tabs" }))
        .await
        .unwrap();
    let message = watcher.expect_event("room_message").await.unwrap();
    assert_eq!(message["text"], "two tabs");

    // Closing one of two tabs keeps Bob online
    tab1.close().await.unwrap();
    tab2.send_event("room_message", json!({ "room": "global", "text": "still here" }))
        .await
        .unwrap();
    let message = watcher.expect_event("room_message").await.unwrap();
    assert_eq!(message["text"], "still here");

    // Closing the last tab takes him offline, once
    tab2.close().await.unwrap();
    let offline = watcher.expect_event("user_offline").await.unwrap();
    assert_eq!(offline["userId"], bob.user.id.as_str());
    assert!(offline["lastSeen"].is_string());
    watcher.assert_silent(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_offline_is_persisted() {
    let server = TestServer::start().await.unwrap();
    let signup = SignupRequest::unique("persist");
    let auth = server.signup(&signup).await.unwrap();
    let observer = server.signup_unique("observer").await.unwrap();
    let mut watcher = server.connect_online(&observer).await.unwrap();

    let ws = server.connect(&auth.token).await.unwrap();
    watcher.wait_for_user("user_online", &auth.user.id).await.unwrap();
    ws.close().await.unwrap();
    watcher.wait_for_user("user_offline", &auth.user.id).await.unwrap();

    // The directory write trails the broadcast
    let mut persisted = None;
    for _ in 0..50 {
        let response = server
            .post("/api/auth/login", &LoginRequest::from_signup(&signup))
            .await
            .unwrap();
        let auth: AuthResponse = response.json().await.unwrap();
        if !auth.user.online && auth.user.last_seen.is_some() {
            persisted = Some(auth.user);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(persisted.is_some(), "offline state never reached the directory");
}

// ============================================================================
// Messaging
// ============================================================================

#[tokio::test]
async fn test_room_message_reaches_every_tab() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("multi").await.unwrap();
    let bob = server.signup_unique("peer").await.unwrap();

    let mut a1 = server.connect(&alice.token).await.unwrap();
    let mut a2 = server.connect(&alice.token).await.unwrap();
    let mut b1 = server.connect(&bob.token).await.unwrap();

    a1.send_event(
        "room_message",
        json!({ "room": "global", "text": "hello all", "meta": { "k": 1 } }),
    )
    .await
    .unwrap();

    // Sender's own tab gets the echo too
    for ws in [&mut a1, &mut a2, &mut b1] {
        let data = ws.wait_for("room_message").await.unwrap();
        assert_eq!(data["text"], "hello all");
        assert_eq!(data["room"], "global");
        assert_eq!(data["meta"], json!({ "k": 1 }));
        assert_eq!(data["sender"]["id"], alice.user.id.as_str());
        assert_eq!(data["sender"]["username"], alice.user.username.as_str());
    }

    assert_eq!(server.messages.len(), 1);
}

#[tokio::test]
async fn test_private_message_reaches_all_endpoints() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("sender").await.unwrap();
    let bob = server.signup_unique("recipient").await.unwrap();
    let carol = server.signup_unique("bystander").await.unwrap();

    let mut a1 = server.connect(&alice.token).await.unwrap();
    let mut a2 = server.connect(&alice.token).await.unwrap();
    let mut b1 = server.connect(&bob.token).await.unwrap();
    let mut c1 = server.connect_online(&carol).await.unwrap();

    a1.send_event(
        "private_message",
        json!({ "toUserId": bob.user.id, "text": "psst" }),
    )
    .await
    .unwrap();

    for ws in [&mut a1, &mut a2, &mut b1] {
        let data = ws.wait_for("private_message").await.unwrap();
        assert_eq!(data["text"], "psst");
        assert_eq!(data["sender"]["id"], alice.user.id.as_str());
        let recipients = data["recipients"].as_array().unwrap();
        assert_eq!(recipients.len(), 2);
    }

    // Carol is online but not a party to the conversation
    let seen = c1.drain(QUIET).await;
    assert!(seen.iter().all(|event| event["event"] != "private_message"));
}

#[tokio::test]
async fn test_private_message_to_offline_user_is_stored() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("early").await.unwrap();
    let bob = server.signup_unique("away").await.unwrap();

    let mut a1 = server.connect(&alice.token).await.unwrap();
    a1.send_event(
        "private_message",
        json!({ "toUserId": bob.user.id, "text": "for later" }),
    )
    .await
    .unwrap();
    a1.wait_for("private_message").await.unwrap();

    let response = server
        .get_auth(&format!("/api/messages/private/{}", alice.user.id), &bob.token)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = response.json().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "for later");
}

#[tokio::test]
async fn test_empty_text_is_dropped() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("blank").await.unwrap();
    let mut ws = server.connect_online(&alice).await.unwrap();

    ws.send_event("room_message", json!({ "room": "global", "text": "" }))
        .await
        .unwrap();
    ws.send_event("room_message", json!({ "room": "global" }))
        .await
        .unwrap();

    ws.assert_silent(QUIET).await.unwrap();
    assert!(server.messages.is_empty());
}

#[tokio::test]
async fn test_whitespace_text_is_delivered_and_stored() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("spaces").await.unwrap();
    let mut ws = server.connect_online(&alice).await.unwrap();

    ws.send_event("room_message", json!({ "room": "global", "text": "   " }))
        .await
        .unwrap();

    let data = ws.expect_event("room_message").await.unwrap();
    assert_eq!(data["text"], "   ");
    assert_eq!(server.messages.len(), 1);
}

// ============================================================================
// Rooms and typing
// ============================================================================

#[tokio::test]
async fn test_join_and_leave_are_announced() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("host").await.unwrap();
    let bob = server.signup_unique("guest").await.unwrap();

    let mut a = server.connect_online(&alice).await.unwrap();
    let mut b = server.connect_online(&bob).await.unwrap();
    a.wait_for_user("user_online", &bob.user.id).await.unwrap();

    a.send_event("join_room", json!({ "room": "dev" })).await.unwrap();
    let joined = a.expect_event("room_joined").await.unwrap();
    assert_eq!(joined["room"], "dev");
    assert_eq!(joined["user"]["id"], alice.user.id.as_str());

    b.send_event("join_room", json!({ "room": "dev" })).await.unwrap();
    for ws in [&mut a, &mut b] {
        let joined = ws.wait_for("room_joined").await.unwrap();
        assert_eq!(joined["user"]["id"], bob.user.id.as_str());
    }

    // Joining twice changes nothing
    b.send_event("join_room", json!({ "room": "dev" })).await.unwrap();

    b.send_event("leave_room", json!({ "room": "dev" })).await.unwrap();
    let left = a.expect_event("room_left").await.unwrap();
    assert_eq!(left["room"], "dev");
    assert_eq!(left["user"]["id"], bob.user.id.as_str());

    // Bob is no longer a member, so only Alice hears the room now
    a.send_event("room_message", json!({ "room": "dev", "text": "alone" }))
        .await
        .unwrap();
    a.expect_event("room_message").await.unwrap();
    b.assert_silent(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_typing_skips_origin_connection() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("typist").await.unwrap();
    let bob = server.signup_unique("reader").await.unwrap();

    let mut a1 = server.connect_online(&alice).await.unwrap();
    let mut a2 = server.connect(&alice.token).await.unwrap();
    let mut b1 = server.connect_online(&bob).await.unwrap();
    a1.wait_for_user("user_online", &bob.user.id).await.unwrap();

    a1.send_event("typing", json!({ "room": "global", "isTyping": true }))
        .await
        .unwrap();

    for ws in [&mut a2, &mut b1] {
        let data = ws.wait_for("typing").await.unwrap();
        assert_eq!(data["room"], "global");
        assert_eq!(data["user"]["id"], alice.user.id.as_str());
        assert_eq!(data["isTyping"], true);
    }
    a1.assert_silent(QUIET).await.unwrap();

    b1.send_event(
        "typing_private",
        json!({ "toUserId": alice.user.id, "isTyping": false }),
    )
    .await
    .unwrap();
    for ws in [&mut a1, &mut a2] {
        let data = ws.wait_for("typing_private").await.unwrap();
        assert_eq!(data["from"]["id"], bob.user.id.as_str());
        assert_eq!(data["isTyping"], false);
    }
}

// ============================================================================
// Connection lifecycle
// ============================================================================

#[tokio::test]
async fn test_non_json_frame_closes_with_decode_error() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("garbled").await.unwrap();
    let mut ws = server.connect(&alice.token).await.unwrap();

    ws.send_raw(Message::Text("this is not json".to_string()))
        .await
        .unwrap();

    assert_eq!(ws.expect_close(Duration::from_secs(5)).await.unwrap(), 4002);
}

#[tokio::test]
async fn test_unknown_event_is_ignored() {
    let server = TestServer::start().await.unwrap();
    let alice = server.signup_unique("curious").await.unwrap();
    let mut ws = server.connect(&alice.token).await.unwrap();

    ws.send_event("does_not_exist", json!({})).await.unwrap();
    ws.send_event("room_message", json!({ "room": "global", "text": "still open" }))
        .await
        .unwrap();

    let data = ws.wait_for("room_message").await.unwrap();
    assert_eq!(data["text"], "still open");
}

#[tokio::test]
async fn test_idle_connection_times_out() {
    // No server pings during the test, so nothing refreshes activity
    let gateway = GatewayConfig {
        heartbeat_interval_secs: 60,
        idle_timeout_secs: 1,
        ..GatewayConfig::default()
    };
    let server = TestServer::start_with_gateway(gateway).await.unwrap();
    let alice = server.signup_unique("sleepy").await.unwrap();
    let mut ws = server.connect(&alice.token).await.unwrap();

    assert_eq!(ws.expect_close(Duration::from_secs(5)).await.unwrap(), 4009);
}
