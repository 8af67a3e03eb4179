//! InMemory backend tests, including snapshot persistence.

use satchel::{Backend, Document, DocumentKey, InMemory, StoredDocument};
use serde_json::json;

use crate::helpers::attrs;

fn stored(doc_type: &str, id: &str, body: serde_json::Value) -> StoredDocument {
    StoredDocument::new(Document::new(doc_type, id, attrs(body)))
}

#[tokio::test]
async fn put_get_remove_roundtrip() {
    let backend = InMemory::new();
    let key = DocumentKey::new("car", "racer");

    backend
        .put(stored("car", "racer", json!({"color": "red"})))
        .await
        .expect("Failed to put");

    let fetched = backend.get(&key).await.expect("Failed to get");
    assert_eq!(fetched.document.get("color"), Some(&json!("red")));
    assert!(!fetched.synced);
    assert!(!fetched.deleted);

    backend.remove(&key).await.expect("Failed to remove");
    let err = backend.get(&key).await.unwrap_err();
    assert!(err.is_not_found());

    // Removing an absent key still succeeds.
    backend.remove(&key).await.expect("Remove must be idempotent");
}

#[tokio::test]
async fn put_replaces_the_envelope_at_the_key() {
    let backend = InMemory::new();
    let key = DocumentKey::new("car", "racer");

    backend
        .put(stored("car", "racer", json!({"color": "red"})))
        .await
        .unwrap();
    backend
        .put(stored("car", "racer", json!({"color": "blue"})))
        .await
        .unwrap();

    assert_eq!(backend.len().await, 1);
    let fetched = backend.get(&key).await.unwrap();
    assert_eq!(fetched.document.get("color"), Some(&json!("blue")));
}

#[tokio::test]
async fn list_scopes_and_orders_by_key() {
    let backend = InMemory::new();

    backend.put(stored("zebra", "z", json!({}))).await.unwrap();
    backend.put(stored("car", "b", json!({}))).await.unwrap();
    backend.put(stored("car", "a", json!({}))).await.unwrap();

    let all = backend.list(None).await.expect("Failed to list");
    let keys: Vec<String> = all.iter().map(|s| s.key().to_string()).collect();
    assert_eq!(keys, ["car/a", "car/b", "zebra/z"]);

    let cars = backend.list(Some("car")).await.unwrap();
    assert_eq!(cars.len(), 2);
    assert!(cars.iter().all(|s| s.document.doc_type == "car"));
}

#[tokio::test]
async fn list_includes_tombstones() {
    let backend = InMemory::new();

    backend
        .put(stored("car", "racer", json!({})).into_tombstone())
        .await
        .unwrap();

    let all = backend.list(None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].deleted);
}

#[tokio::test]
async fn mark_synced_sets_the_flag() {
    let backend = InMemory::new();
    let key = DocumentKey::new("car", "racer");

    backend.put(stored("car", "racer", json!({}))).await.unwrap();
    backend.mark_synced(&key).await.expect("Failed to mark");
    assert!(backend.get(&key).await.unwrap().synced);

    let err = backend
        .mark_synced(&DocumentKey::new("car", "ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn snapshot_round_trips_flags_and_tombstones() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("satchel.json");

    let backend = InMemory::new();
    backend
        .put(stored("car", "racer", json!({"color": "red"})))
        .await
        .unwrap();
    backend
        .mark_synced(&DocumentKey::new("car", "racer"))
        .await
        .unwrap();
    backend
        .put(stored("car", "gone", json!({"color": "blue"})).into_tombstone())
        .await
        .unwrap();

    backend.save_to_file(&path).await.expect("Failed to save");

    let loaded = InMemory::load_from_file(&path).expect("Failed to load");
    assert_eq!(
        loaded.list(None).await.unwrap(),
        backend.list(None).await.unwrap()
    );

    let tombstone = loaded
        .get(&DocumentKey::new("car", "gone"))
        .await
        .unwrap();
    assert!(tombstone.deleted);
    assert_eq!(tombstone.document.get("color"), Some(&json!("blue")));
}

#[tokio::test]
async fn loading_a_missing_snapshot_yields_an_empty_backend() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let loaded =
        InMemory::load_from_file(dir.path().join("absent.json")).expect("Missing file is fine");
    assert!(loaded.is_empty().await);
    assert!(loaded.all_keys().await.is_empty());
}
