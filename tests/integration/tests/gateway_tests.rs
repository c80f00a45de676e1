//! Gateway integration tests
//!
//! End-to-end tests driving real WebSocket clients against an in-process
//! gateway with in-memory stores.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use integration_tests::{bad_token_for, identity, token_for, FailingMessageStore, TestServer};
use roomcast_gateway::protocol::{
    ClientEvent, CloseCode, DeleteMessagePayload, IdentifyPayload, JoinPayload, ServerEvent,
};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Health and handshake
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_identify_returns_ready() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");

    let mut client = server.connect().await.unwrap();
    let ready = client.identify(&token_for(&alice)).await.unwrap();

    assert_eq!(ready.identity.id, alice.id);
    assert_eq!(ready.identity.display_name, "alice");
}

#[tokio::test]
async fn test_bad_token_closes_with_auth_failure() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");

    let mut client = server.connect().await.unwrap();
    client
        .send(&ClientEvent::Identify(IdentifyPayload {
            token: bad_token_for(&alice),
        }))
        .await
        .unwrap();

    let code = client.recv_close().await.unwrap();
    assert_eq!(code, Some(CloseCode::AuthenticationFailed.as_u16()));
}

#[tokio::test]
async fn test_event_before_identify_closes_connection() {
    let server = TestServer::start().await.unwrap();

    let mut client = server.connect().await.unwrap();
    client
        .send(&ClientEvent::Join(JoinPayload {
            room: "r1".to_string(),
        }))
        .await
        .unwrap();

    let code = client.recv_close().await.unwrap();
    assert_eq!(code, Some(CloseCode::NotAuthenticated.as_u16()));
}

#[tokio::test]
async fn test_second_identify_closes_connection() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");

    let mut client = server.connect_as(&alice).await.unwrap();
    client
        .send(&ClientEvent::Identify(IdentifyPayload {
            token: token_for(&alice),
        }))
        .await
        .unwrap();

    let code = client.recv_close().await.unwrap();
    assert_eq!(code, Some(CloseCode::AlreadyAuthenticated.as_u16()));
}

// ============================================================================
// Join, replay, and presence
// ============================================================================

#[tokio::test]
async fn test_join_empty_room_replays_nothing() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");

    let (_client, history, members) = server.join_as(&alice, "r1").await.unwrap();

    assert!(history.is_empty());
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].identity.id, alice.id);
    assert_eq!(members[0].room, "r1");
}

#[tokio::test]
async fn test_join_replays_history_to_joiner_only() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    a.send_message("hello").await.unwrap();
    let sent = a.expect_message().await.unwrap();
    assert_eq!(sent.body, "hello");
    assert_eq!(sent.sender_name, "alice");

    let (mut b, history, members) = server.join_as(&bob, "r1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].body, "hello");
    assert_eq!(members.len(), 2);

    // The joiner's presence snapshot also reaches the existing member,
    // but no replay does.
    let snapshot = a.expect_online_users().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    a.assert_silent().await.unwrap();
    b.assert_silent().await.unwrap();
}

#[tokio::test]
async fn test_messages_broadcast_in_order() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message("first").await.unwrap();
    b.send_message("second").await.unwrap();

    let a1 = a.expect_message().await.unwrap();
    let a2 = a.expect_message().await.unwrap();
    let b1 = b.expect_message().await.unwrap();
    let b2 = b.expect_message().await.unwrap();

    // Both observers see the same messages in the same order
    assert_eq!(a1.id, b1.id);
    assert_eq!(a2.id, b2.id);
    assert!(a1.id.value() < a2.id.value());
}

#[tokio::test]
async fn test_leave_room_updates_presence() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send(&ClientEvent::LeaveRoom).await.unwrap();

    let members = b.expect_online_users().await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].identity.id, bob.id);

    // The leaver stays connected and can join again
    let (_, members) = a.join("r1").await.unwrap();
    assert_eq!(members.len(), 2);
}

// ============================================================================
// Room lifecycle
// ============================================================================

#[tokio::test]
async fn test_room_history_purged_when_emptied() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    a.send_message("ephemeral").await.unwrap();
    a.expect_message().await.unwrap();

    // Abrupt disconnect empties the room
    drop(a);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (_b, history, _) = server.join_as(&bob, "r1").await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_history_survives_while_room_occupied() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");
    let carol = identity("u3", "carol");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message("kept").await.unwrap();
    a.expect_message().await.unwrap();

    // One member leaves; the other still holds the room open
    drop(a);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (_c, history, _) = server.join_as(&carol, "r1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].body, "kept");

    drop(b);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_broadcasts_once() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message("doomed").await.unwrap();
    let message = a.expect_message().await.unwrap();
    b.expect_message().await.unwrap();

    a.send(&ClientEvent::DeleteMessage(DeleteMessagePayload {
        id: message.id,
    }))
    .await
    .unwrap();

    assert!(matches!(
        a.recv().await.unwrap(),
        ServerEvent::MessageDeleted(p) if p.id == message.id
    ));
    assert!(matches!(
        b.recv().await.unwrap(),
        ServerEvent::MessageDeleted(p) if p.id == message.id
    ));

    // Deleting the same id again is a silent no-op
    a.send(&ClientEvent::DeleteMessage(DeleteMessagePayload {
        id: message.id,
    }))
    .await
    .unwrap();
    a.assert_silent().await.unwrap();
    b.assert_silent().await.unwrap();
}

// ============================================================================
// Typing
// ============================================================================

#[tokio::test]
async fn test_typing_relayed_to_others_only() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send(&ClientEvent::Typing).await.unwrap();

    match b.recv().await.unwrap() {
        ServerEvent::Typing(payload) => {
            assert_eq!(payload.sender_name, "alice");
            assert_eq!(payload.expires_in_ms, 1200);
        }
        other => panic!("Expected typing, got {other:?}"),
    }

    // Never echoed back to the sender
    a.assert_silent().await.unwrap();
}

// ============================================================================
// Seen watermark
// ============================================================================

#[tokio::test]
async fn test_seen_broadcasts_only_when_watermark_moves() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message("unread").await.unwrap();
    a.expect_message().await.unwrap();
    b.expect_message().await.unwrap();

    b.send(&ClientEvent::Seen).await.unwrap();
    assert!(matches!(a.recv().await.unwrap(), ServerEvent::Seen));
    assert!(matches!(b.recv().await.unwrap(), ServerEvent::Seen));

    // Nothing left to mark: no broadcast
    b.send(&ClientEvent::Seen).await.unwrap();
    a.assert_silent().await.unwrap();
    b.assert_silent().await.unwrap();
}

// ============================================================================
// Input robustness
// ============================================================================

#[tokio::test]
async fn test_malformed_frame_does_not_kill_connection() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");

    let mut client = server.connect_as(&alice).await.unwrap();
    client.send_raw("{this is not json").await.unwrap();
    client.send_raw(r#"{"event":"noSuchEvent"}"#).await.unwrap();

    // The connection survives and works normally afterwards
    let (history, members) = client.join("r1").await.unwrap();
    assert!(history.is_empty());
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn test_empty_message_rejected_to_sender_only() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message("   ").await.unwrap();

    match a.recv().await.unwrap() {
        ServerEvent::SendFailed { reason } => assert!(!reason.is_empty()),
        other => panic!("Expected sendFailed, got {other:?}"),
    }
    b.assert_silent().await.unwrap();
}

#[tokio::test]
async fn test_oversized_message_rejected_to_sender_only() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message(&"x".repeat(4001)).await.unwrap();

    match a.recv().await.unwrap() {
        ServerEvent::SendFailed { reason } => assert!(reason.contains("4000"), "{reason}"),
        other => panic!("Expected sendFailed, got {other:?}"),
    }
    b.assert_silent().await.unwrap();
}

#[tokio::test]
async fn test_storage_failure_rejected_to_sender_only() {
    let server = TestServer::start_with_message_store(Arc::new(FailingMessageStore::new()))
        .await
        .unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    let (mut b, _, _) = server.join_as(&bob, "r1").await.unwrap();
    a.expect_online_users().await.unwrap();

    a.send_message("hello").await.unwrap();

    // The failed persist reaches only the originator; nothing is broadcast.
    match a.recv().await.unwrap() {
        ServerEvent::SendFailed { reason } => assert!(!reason.is_empty()),
        other => panic!("Expected sendFailed, got {other:?}"),
    }
    b.assert_silent().await.unwrap();

    // The connection survives and the room stays functional
    a.send_message("again").await.unwrap();
    match a.recv().await.unwrap() {
        ServerEvent::SendFailed { .. } => {}
        other => panic!("Expected sendFailed, got {other:?}"),
    }

    // Departures still complete when the purge-on-empty write fails
    a.close().await.unwrap();
    let members = b.expect_online_users().await.unwrap();
    assert_eq!(members.len(), 1);
    b.close().await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (_, history, members) = server.join_as(&identity("u3", "carol"), "r1").await.unwrap();
    assert!(history.is_empty());
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn test_send_outside_room_is_ignored() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");

    let mut client = server.connect_as(&alice).await.unwrap();
    client.send_message("to nowhere").await.unwrap();
    client.assert_silent().await.unwrap();
}

// ============================================================================
// Re-join
// ============================================================================

#[tokio::test]
async fn test_switching_rooms_purges_vacated_room() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("u1", "alice");
    let bob = identity("u2", "bob");

    let (mut a, _, _) = server.join_as(&alice, "r1").await.unwrap();
    a.send_message("left behind").await.unwrap();
    a.expect_message().await.unwrap();

    // Switching rooms empties r1
    let (history, _) = a.join("r2").await.unwrap();
    assert!(history.is_empty());

    let (_b, history, _) = server.join_as(&bob, "r1").await.unwrap();
    assert!(history.is_empty());
}
