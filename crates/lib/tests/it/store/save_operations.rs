//! Save and create operation tests.

use satchel::StoreOptions;
use satchel::store::DocumentFilter;
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn save_round_trips_a_document() {
    let (store, _backend) = test_store();

    let saved = store
        .save(
            "car",
            Some("racer"),
            json!({"color": "red", "doors": 2}),
            &StoreOptions::default(),
        )
        .await
        .expect("Failed to save document");
    assert_eq!(saved.doc_type, "car");
    assert_eq!(saved.id, "racer");

    let loaded = store.load("car", "racer").await.expect("Failed to load");
    assert_eq!(loaded, saved);
    assert_eq!(loaded.get("color"), Some(&json!("red")));
    assert_eq!(loaded.get("doors"), Some(&json!(2)));
}

#[tokio::test]
async fn save_generates_an_id_when_omitted() {
    let (store, _backend) = test_store();

    let saved = store
        .save("car", None, json!({"color": "red"}), &StoreOptions::default())
        .await
        .expect("Failed to save without id");
    assert_eq!(saved.id.len(), 7);
    assert!(
        saved
            .id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    );

    // An empty id means "generate one" as well.
    let saved_empty = store
        .save(
            "car",
            Some(""),
            json!({"color": "blue"}),
            &StoreOptions::default(),
        )
        .await
        .expect("Failed to save with empty id");
    assert_eq!(saved_empty.id.len(), 7);
    assert_ne!(saved_empty.id, saved.id);
}

#[tokio::test]
async fn save_rejects_invalid_types_without_writing() {
    let (store, _backend) = test_store();

    for doc_type in ["Car", "c", "1car", "car!", ""] {
        let err = store
            .save(
                doc_type,
                Some("racer"),
                json!({"color": "red"}),
                &StoreOptions::default(),
            )
            .await
            .expect_err("invalid type must be rejected");
        assert!(err.is_invalid_key(), "unexpected error: {err}");
    }

    let all = store
        .load_all(DocumentFilter::All)
        .await
        .expect("Failed to list");
    assert!(all.is_empty(), "rejected saves must not mutate state");
}

#[tokio::test]
async fn save_rejects_invalid_ids_without_writing() {
    let (store, _backend) = test_store();

    for id in ["Racer", "ra cer", "ra_cer", "racer!"] {
        let err = store
            .save(
                "car",
                Some(id),
                json!({"color": "red"}),
                &StoreOptions::default(),
            )
            .await
            .expect_err("invalid id must be rejected");
        assert!(err.is_invalid_key(), "unexpected error: {err}");
    }

    let all = store
        .load_all(DocumentFilter::All)
        .await
        .expect("Failed to list");
    assert!(all.is_empty());
}

#[tokio::test]
async fn save_rejects_non_object_bodies() {
    let (store, _backend) = test_store();

    for body in [json!(null), json!(42), json!("text"), json!([1, 2, 3])] {
        let err = store
            .save("car", Some("racer"), body, &StoreOptions::default())
            .await
            .expect_err("non-object body must be rejected");
        assert!(err.is_invalid_arguments(), "unexpected error: {err}");
    }

    let err = store.load("car", "racer").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn save_overwrites_the_whole_document() {
    let (store, _backend) = test_store();

    store
        .save(
            "car",
            Some("racer"),
            json!({"color": "red", "doors": 2}),
            &StoreOptions::default(),
        )
        .await
        .unwrap();
    store
        .save(
            "car",
            Some("racer"),
            json!({"sold": true}),
            &StoreOptions::default(),
        )
        .await
        .unwrap();

    let loaded = store.load("car", "racer").await.unwrap();
    assert_eq!(loaded.get("sold"), Some(&json!(true)));
    // Full overwrite, not a merge: the old attributes are gone.
    assert_eq!(loaded.get("color"), None);
    assert_eq!(loaded.get("doors"), None);
}

#[tokio::test]
async fn save_stamps_type_and_id_from_the_arguments() {
    let (store, _backend) = test_store();

    let saved = store
        .save(
            "car",
            Some("racer"),
            json!({"type": "boat", "id": "other", "color": "red"}),
            &StoreOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(saved.doc_type, "car");
    assert_eq!(saved.id, "racer");
    assert_eq!(saved.get("type"), None);
    assert_eq!(saved.get("id"), None);

    let err = store.load("boat", "other").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn create_always_generates_a_fresh_id() {
    let (store, _backend) = test_store();

    let first = store
        .create("car", json!({"color": "red"}), &StoreOptions::default())
        .await
        .expect("Failed to create");
    let second = store
        .create("car", json!({"color": "red"}), &StoreOptions::default())
        .await
        .expect("Failed to create");

    for document in [&first, &second] {
        assert_eq!(document.id.len(), 7);
        assert!(
            document
                .id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        );
    }
    assert_ne!(first.id, second.id);

    let cars = store.load_all("car").await.expect("Failed to list cars");
    assert_eq!(cars.len(), 2);
}
