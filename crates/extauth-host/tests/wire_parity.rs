//! Wire parity tests: the action-tagged JSON messages and replies
//! match the shapes the extension contexts exchange over
//! `chrome.runtime`.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use extauth_background::{CoordinatorHandle, NoopReloadHost, SessionCoordinator};
use extauth_core::ExtAuthConfig;
use extauth_protocol::Message;
use extauth_store::SessionStore;

fn spawn_coordinator(dir: &std::path::Path) -> (CoordinatorHandle, tokio::task::JoinHandle<()>) {
    let store = Arc::new(SessionStore::open(dir).unwrap());
    SessionCoordinator::spawn(store, ExtAuthConfig::for_tests(), Arc::new(NoopReloadHost))
}

async fn send_raw(handle: &CoordinatorHandle, raw: Value) -> Value {
    let message: Message = serde_json::from_value(raw).unwrap();
    let response = handle.send(message).await.unwrap();
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn test_login_and_auth_state_shapes() {
    let dir = TempDir::new().unwrap();
    let (handle, task) = spawn_coordinator(dir.path());

    let ack = send_raw(
        &handle,
        json!({"action": "login", "username": "alice", "token": "abc123"}),
    )
    .await;
    assert_eq!(ack, json!({"success": true}));

    let state = send_raw(&handle, json!({"action": "getAuthState"})).await;
    assert_eq!(
        state,
        json!({"isLoggedIn": true, "username": "alice", "token": "abc123"})
    );

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_logged_out_state_has_explicit_nulls() {
    let dir = TempDir::new().unwrap();
    let (handle, task) = spawn_coordinator(dir.path());

    let state = send_raw(&handle, json!({"action": "getAuthState"})).await;
    assert_eq!(
        state,
        json!({"isLoggedIn": false, "username": null, "token": null})
    );

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_logout_shape() {
    let dir = TempDir::new().unwrap();
    let (handle, task) = spawn_coordinator(dir.path());

    send_raw(
        &handle,
        json!({"action": "login", "username": "bob", "token": "t"}),
    )
    .await;
    let ack = send_raw(
        &handle,
        json!({"action": "logout", "previousUser": "bob", "requestReload": false}),
    )
    .await;
    assert_eq!(ack, json!({"success": true}));

    let state = send_raw(&handle, json!({"action": "getAuthState"})).await;
    assert_eq!(state["isLoggedIn"], json!(false));

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_log_echo_shape() {
    let dir = TempDir::new().unwrap();
    let (handle, task) = spawn_coordinator(dir.path());

    let receipt = send_raw(
        &handle,
        json!({"action": "log", "text": "Test console log from a third-party execution context"}),
    )
    .await;
    assert_eq!(receipt, json!({"received": true}));

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_set_test_mode_accepts_legacy_payload() {
    let dir = TempDir::new().unwrap();
    let (handle, task) = spawn_coordinator(dir.path());

    // Older callers sent an `enabled` field; it parses and is ignored.
    let ack = send_raw(&handle, json!({"action": "setTestMode", "enabled": true})).await;
    assert_eq!(ack, json!({"success": true}));

    drop(handle);
    task.await.unwrap();
}

#[test]
fn test_unknown_action_is_rejected() {
    let result: Result<Message, _> =
        serde_json::from_value(json!({"action": "dropSession"}));
    assert!(result.is_err());
}
