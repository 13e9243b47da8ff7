//! Integration tests for WebSocket authentication and messaging.

mod helpers;

use std::time::Duration;

use axum::body::Body;
use futures::{SinkExt, StreamExt};
use http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use socialhub_core::config::AppConfig;

use helpers::{TestApp, uid};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open(addr: std::net::SocketAddr, token: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .expect("WebSocket handshake failed");
    client
}

async fn send(client: &mut Client, frame: &str) {
    client
        .send(Message::text(frame))
        .await
        .expect("Failed to send frame");
}

/// Next application event, skipping keepalive pings.
async fn next_event(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("Timed out waiting for an event")
            .expect("Connection closed")
            .expect("WebSocket error");

        if let Message::Text(text) = message {
            let event: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
            if event["event"] != "ping" {
                return event;
            }
        }
    }
}

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_upgrade_with_forged_token() {
    let app = TestApp::new();
    let forged = socialhub_auth::JwtEncoder::new(&socialhub_core::config::AuthConfig {
        jwt_secret: "someone-else".to_string(),
        leeway_seconds: 0,
    })
    .issue(&uid("u1"), chrono::Duration::minutes(5))
    .unwrap();

    let response = app
        .router()
        .oneshot(
            Request::get(format!("/ws?token={forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.engine.registry.session_count(), 0);
}

#[tokio::test]
async fn test_join_announces_presence_to_other_clients() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut alice = open(addr, &app.token_for("u1")).await;
    send(&mut alice, r#"{"event":"join","data":"u1"}"#).await;
    let event = next_event(&mut alice).await;
    assert_eq!(event["event"], "userStatusChange");
    assert_eq!(event["data"]["userId"], "u1");
    assert_eq!(event["data"]["status"], "online");

    let mut bob = open(addr, &app.token_for("u2")).await;
    send(&mut bob, r#"{"event":"join","data":"u2"}"#).await;
    let event = next_event(&mut alice).await;
    assert_eq!(event["data"]["userId"], "u2");
    assert_eq!(event["data"]["status"], "online");

    bob.close(None).await.unwrap();
    let event = next_event(&mut alice).await;
    assert_eq!(event["event"], "userStatusChange");
    assert_eq!(event["data"]["userId"], "u2");
    assert_eq!(event["data"]["status"], "offline");
    assert!(event["data"]["lastSeen"].is_string());
}

#[tokio::test]
async fn test_join_for_another_user_is_ignored() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut client = open(addr, &app.token_for("u1")).await;
    send(&mut client, r#"{"event":"join","data":"u2"}"#).await;
    send(&mut client, r#"{"event":"join","data":"u1"}"#).await;

    // Frames are handled in order, so the first announcement proves the
    // impersonating join was dropped.
    let event = next_event(&mut client).await;
    assert_eq!(event["data"]["userId"], "u1");
    assert!(!app.engine.presence.is_online(&uid("u2")));
}

#[tokio::test]
async fn test_typing_is_relayed_over_the_socket() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut alice = open(addr, &app.token_for("u1")).await;
    send(&mut alice, r#"{"event":"join","data":"u1"}"#).await;
    next_event(&mut alice).await;

    let mut bob = open(addr, &app.token_for("u2")).await;
    send(&mut bob, r#"{"event":"join","data":"u2"}"#).await;
    next_event(&mut bob).await;
    next_event(&mut alice).await;

    send(&mut alice, r#"{"event":"joinChatRoom","data":{"chatId":"c1"}}"#).await;
    send(&mut bob, r#"{"event":"joinChatRoom","data":{"chatId":"c1"}}"#).await;

    // Wait until both sessions sit in the room.
    for _ in 0..50 {
        if app
            .engine
            .rooms
            .member_count(&socialhub_realtime::RoomKey::Chat(
                socialhub_core::types::ChatId::parse("c1").unwrap(),
            ))
            == 2
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    send(&mut alice, r#"{"event":"typing","data":{"chatId":"c1"}}"#).await;
    let event = next_event(&mut bob).await;
    assert_eq!(event["event"], "userTyping");
    assert_eq!(event["data"]["userId"], "u1");
}

#[tokio::test]
async fn test_transport_pongs_keep_a_quiet_client_online() {
    let mut config = AppConfig::default();
    config.realtime.ping_interval_seconds = 1;
    config.realtime.ping_timeout_seconds = 2;
    let app = TestApp::with_config(config);
    let addr = app.spawn().await;

    let mut client = open(addr, &app.token_for("u1")).await;
    send(&mut client, r#"{"event":"join","data":"u1"}"#).await;
    next_event(&mut client).await;

    // Never send the `pong` event; only the client's automatic replies to
    // ping frames can keep it alive past the timeout.
    let deadline = tokio::time::Instant::now() + Duration::from_millis(3500);
    let mut ping_frames = 0;
    loop {
        match tokio::time::timeout_at(deadline, client.next()).await {
            Err(_) => break,
            Ok(Some(Ok(Message::Ping(_)))) => ping_frames += 1,
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                panic!("Server closed a connection that answered every ping")
            }
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => panic!("WebSocket error: {e}"),
        }
    }

    assert!(ping_frames >= 2, "expected ping frames, saw {ping_frames}");
    assert!(app.engine.presence.is_online(&uid("u1")));
    assert_eq!(app.engine.registry.session_count(), 1);
}
