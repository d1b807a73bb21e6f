//! Integration tests for credential durability across restarts.

use std::sync::Arc;

use courtside_credentials::{CredentialStore, FileCredentialBackend};

#[tokio::test]
async fn test_pair_survives_simulated_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session/credentials.json");

    let store = CredentialStore::open(Arc::new(FileCredentialBackend::new(&path)))
        .await
        .expect("open");
    store
        .set("access-1", Some("refresh-1".to_string()))
        .await
        .expect("set");
    drop(store);

    // A fresh store over the same path is the restarted process.
    let restarted = CredentialStore::open(Arc::new(FileCredentialBackend::new(&path)))
        .await
        .expect("reopen");
    let pair = restarted.get();
    assert_eq!(pair.access_token.as_deref(), Some("access-1"));
    assert_eq!(pair.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_logout_survives_simulated_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credentials.json");

    let store = CredentialStore::open(Arc::new(FileCredentialBackend::new(&path)))
        .await
        .expect("open");
    store
        .set("access-1", Some("refresh-1".to_string()))
        .await
        .expect("set");
    store.clear().await.expect("clear");
    drop(store);

    let restarted = CredentialStore::open(Arc::new(FileCredentialBackend::new(&path)))
        .await
        .expect("reopen");
    assert!(restarted.get().is_empty());
}

#[tokio::test]
async fn test_rotation_without_new_refresh_token_is_durable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credentials.json");

    let store = CredentialStore::open(Arc::new(FileCredentialBackend::new(&path)))
        .await
        .expect("open");
    store
        .set("access-1", Some("refresh-1".to_string()))
        .await
        .expect("set");
    store.set("access-2", None).await.expect("rotate");
    drop(store);

    let restarted = CredentialStore::open(Arc::new(FileCredentialBackend::new(&path)))
        .await
        .expect("reopen");
    let pair = restarted.get();
    assert_eq!(pair.access_token.as_deref(), Some("access-2"));
    assert_eq!(pair.refresh_token.as_deref(), Some("refresh-1"));
}
