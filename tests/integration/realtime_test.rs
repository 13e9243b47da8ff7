//! Integration tests for the real-time engine driven through its public
//! surface, with in-memory stores behind it.

mod helpers;

use std::time::Duration;

use chrono::Utc;

use socialhub_core::types::{ChatId, MessageId, PostId};
use socialhub_database::PresenceStore;
use socialhub_entity::{ChatMessage, ChatRef, MessageType, PostRef};
use socialhub_realtime::{Notifier, OutboundEvent};

use helpers::{TestApp, drain, named, summary, uid};

#[tokio::test]
async fn test_second_tab_lifecycle_broadcasts_only_zero_crossings() {
    let app = TestApp::new();
    let router = &app.engine.router;
    let u1 = uid("u1");

    let (observer, mut observer_rx) = router.connect();
    router.join(observer.id, &uid("watcher")).unwrap();
    drain(&mut observer_rx);

    let (s1, _s1_rx) = router.connect();
    router.join(s1.id, &u1).unwrap();
    let events = drain(&mut observer_rx);
    let changes = named(&events, "userStatusChange");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["data"]["userId"], "u1");
    assert_eq!(changes[0]["data"]["status"], "online");
    assert!(changes[0]["data"].get("lastSeen").is_none());

    let (s2, _s2_rx) = router.connect();
    router.join(s2.id, &u1).unwrap();
    assert!(drain(&mut observer_rx).is_empty());

    router.disconnect(s1.id);
    assert!(drain(&mut observer_rx).is_empty());
    assert!(app.engine.presence.is_online(&u1));

    router.disconnect(s2.id);
    let events = drain(&mut observer_rx);
    let changes = named(&events, "userStatusChange");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["data"]["userId"], "u1");
    assert_eq!(changes[0]["data"]["status"], "offline");
    assert!(changes[0]["data"]["lastSeen"].is_string());
}

#[tokio::test]
async fn test_typing_reaches_peer_and_never_echoes() {
    let app = TestApp::new();
    let router = &app.engine.router;

    let (a, mut a_rx) = router.connect();
    let (b, mut b_rx) = router.connect();
    router.handle_inbound(a.id, r#"{"event":"join","data":"u1"}"#);
    router.handle_inbound(b.id, r#"{"event":"join","data":"u2"}"#);
    router.handle_inbound(a.id, r#"{"event":"joinChatRoom","data":{"chatId":"c1"}}"#);
    router.handle_inbound(b.id, r#"{"event":"joinChatRoom","data":{"chatId":"c1"}}"#);
    drain(&mut a_rx);
    drain(&mut b_rx);

    router.handle_inbound(
        a.id,
        r#"{"event":"typing","data":{"chatId":"c1","userId":"u1"}}"#,
    );

    let received = drain(&mut b_rx);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["event"], "userTyping");
    assert_eq!(received[0]["data"]["userId"], "u1");
    assert!(drain(&mut a_rx).is_empty());
}

#[tokio::test]
async fn test_online_flag_tracks_joined_session_count() {
    let app = TestApp::new();
    let router = &app.engine.router;
    let u1 = uid("u1");

    let sessions: Vec<_> = (0..4).map(|_| router.connect()).collect();
    let mut joined = 0usize;

    // join 0, join 1, drop 0, join 2, drop 1, drop 2, join 3, drop 3
    let script: [(usize, bool); 8] = [
        (0, true),
        (1, true),
        (0, false),
        (2, true),
        (1, false),
        (2, false),
        (3, true),
        (3, false),
    ];

    for (index, join) in script {
        let id = sessions[index].0.id;
        if join {
            router.join(id, &u1).unwrap();
            joined += 1;
        } else {
            router.disconnect(id);
            joined -= 1;
        }
        assert_eq!(app.engine.presence.is_online(&u1), joined > 0);
        assert_eq!(app.engine.registry.is_user_connected(&u1), joined > 0);
    }
}

#[tokio::test]
async fn test_repeated_join_keeps_single_membership() {
    let app = TestApp::new();
    let router = &app.engine.router;
    let u1 = uid("u1");

    let (observer, mut observer_rx) = router.connect();
    router.join(observer.id, &uid("watcher")).unwrap();
    drain(&mut observer_rx);

    let (s1, _rx) = router.connect();
    router.join(s1.id, &u1).unwrap();
    router.join(s1.id, &u1).unwrap();

    let events = drain(&mut observer_rx);
    assert_eq!(named(&events, "userStatusChange").len(), 1);
    assert_eq!(router.sessions_for(&u1).len(), 1);
    assert_eq!(app.engine.rooms.rooms_of(s1.id).len(), 1);
}

#[tokio::test]
async fn test_delivery_to_offline_user_is_silent() {
    let app = TestApp::new();
    let reached = app.engine.router.deliver_to_user(
        &uid("ghost"),
        OutboundEvent::UserTyping { user_id: uid("u1") },
    );
    assert_eq!(reached, 0);
    assert_eq!(app.engine.metrics.snapshot().deliveries_dropped, 1);
}

#[tokio::test]
async fn test_final_presence_is_persisted_with_latest_version() {
    let app = TestApp::new();
    let router = &app.engine.router;
    let u1 = uid("u1");

    for _ in 0..3 {
        let (s, _rx) = router.connect();
        router.join(s.id, &u1).unwrap();
        router.disconnect(s.id);
    }
    let (s, _rx) = router.connect();
    router.join(s.id, &u1).unwrap();
    let online_version = app.engine.presence.get(&u1).unwrap().version;
    let offline = router.disconnect(s.id).unwrap();

    app.engine.shutdown().await.unwrap();

    let stored = app.presence_store.load_presence(&u1).await.unwrap().unwrap();
    assert!(!stored.is_online);
    assert_eq!(stored.version, offline.version);
    assert!(stored.version > online_version);

    // Once stored, the offline state is no longer held in memory.
    assert!(app.engine.presence.get(&u1).is_none());
    assert_eq!(app.engine.presence.tracked_count(), 0);
}

#[tokio::test]
async fn test_presence_write_failure_leaves_live_state_intact() {
    let app = TestApp::new();
    app.presence_store.set_failing(true);
    let router = &app.engine.router;
    let u1 = uid("u1");

    let (observer, mut observer_rx) = router.connect();
    router.join(observer.id, &uid("watcher")).unwrap();
    drain(&mut observer_rx);

    let (s1, _rx) = router.connect();
    router.join(s1.id, &u1).unwrap();

    let events = drain(&mut observer_rx);
    let changes = named(&events, "userStatusChange");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["data"]["userId"], "u1");
    assert_eq!(changes[0]["data"]["status"], "online");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.engine.presence.is_online(&u1));
    assert!(app.presence_store.is_empty().await);

    router.disconnect(s1.id);
    let events = drain(&mut observer_rx);
    assert_eq!(named(&events, "userStatusChange")[0]["data"]["status"], "offline");

    // An unpersisted offline state stays in memory.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!app.engine.presence.get(&u1).unwrap().is_online);
    assert!(app.presence_store.is_empty().await);
}

#[tokio::test]
async fn test_restarted_engine_overrides_previous_records() {
    let first = TestApp::new();
    let u1 = uid("u1");
    let (s, _rx) = first.engine.router.connect();
    first.engine.router.join(s.id, &u1).unwrap();
    first.engine.shutdown().await.unwrap();

    // Second process, same store.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let store = first.presence_store.clone();
    let second = socialhub_realtime::RealtimeEngine::new(Default::default(), store.clone());
    let (s, _rx) = second.router.connect();
    second.router.join(s.id, &u1).unwrap();

    let mut online = false;
    for _ in 0..50 {
        if let Some(record) = store.load_presence(&u1).await.unwrap() {
            if record.is_online {
                online = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(online, "a newer process must be able to mark the user online");
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_like_is_persisted_then_pushed() {
    let app = TestApp::new();
    let router = &app.engine.router;
    let (s2, mut rx2) = router.connect();
    router.join(s2.id, &uid("u2")).unwrap();
    drain(&mut rx2);

    let post = PostRef {
        id: PostId::parse("p1").unwrap(),
        author_id: uid("u2"),
        content: "hello".to_string(),
    };
    let report = app.producer.post_liked(&summary("u1"), &post).await;

    assert!(report.is_success());
    assert_eq!(report.persisted, 1);
    assert_eq!(report.sessions_reached, 1);

    let stored = app.notification_store.for_recipient(&uid("u2")).await;
    assert_eq!(stored.len(), 1);

    let events = drain(&mut rx2);
    let pushed = named(&events, "newNotification");
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0]["data"]["type"], "like");
    assert_eq!(pushed[0]["data"]["sender"]["username"], "u1");
    assert_eq!(pushed[0]["data"]["_id"], stored[0].id.as_str());
}

#[tokio::test]
async fn test_unpersisted_notification_is_never_pushed() {
    let app = TestApp::new();
    let router = &app.engine.router;
    let (s3, mut rx3) = router.connect();
    router.join(s3.id, &uid("u3")).unwrap();
    drain(&mut rx3);

    app.notification_store.fail_for(uid("u3")).await;
    let report = app.producer.user_followed(&summary("u1"), &uid("u3")).await;

    assert_eq!(report.persisted, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].recipient, uid("u3"));
    assert!(drain(&mut rx3).is_empty());
}

#[tokio::test]
async fn test_chat_message_reaches_every_other_participant() {
    let app = TestApp::new();
    let router = &app.engine.router;

    let (s1, mut rx1) = router.connect();
    let (s2, mut rx2) = router.connect();
    router.join(s1.id, &uid("u1")).unwrap();
    router.join(s2.id, &uid("u2")).unwrap();
    drain(&mut rx1);
    drain(&mut rx2);

    let chat = ChatRef {
        id: ChatId::parse("c1").unwrap(),
        participants: vec![uid("u1"), uid("u2")],
    };
    let message = ChatMessage {
        id: MessageId::parse("m1").unwrap(),
        chat_id: chat.id.clone(),
        sender: summary("u1"),
        content: "see you at eight".to_string(),
        message_type: MessageType::Text,
        created_at: Utc::now(),
    };

    let report = app.producer.message_sent(&chat, &message).await;
    assert_eq!(report.persisted, 1);

    let events = drain(&mut rx2);
    assert_eq!(named(&events, "newNotification").len(), 1);
    let messages = named(&events, "newMessage");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["data"]["chatId"], "c1");
    assert_eq!(messages[0]["data"]["message"]["_id"], "m1");
    assert!(drain(&mut rx1).is_empty());

    let deleted = app
        .producer
        .message_deleted(&chat, &MessageId::parse("m1").unwrap());
    assert_eq!(deleted.sessions_reached, 2);
    assert_eq!(named(&drain(&mut rx1), "messageDeleted").len(), 1);
    assert_eq!(named(&drain(&mut rx2), "messageDeleted").len(), 1);
}
