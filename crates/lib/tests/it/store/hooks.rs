//! Change-hook dispatch tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use satchel::store::{ChangeEvent, ChangeHook, ChangeHookCollection, ChangeKind};
use satchel::{InMemory, ObjectUpdate, Store, StoreOptions};
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn hooks_observe_add_update_and_remove_in_order() {
    let (store, _backend, recorder) = store_with_recorder();

    store
        .save(
            "car",
            Some("racer"),
            json!({"color": "red"}),
            &StoreOptions::default(),
        )
        .await
        .unwrap();
    store
        .save(
            "car",
            Some("racer"),
            json!({"color": "blue"}),
            &StoreOptions::default(),
        )
        .await
        .unwrap();
    store
        .update(
            "car",
            "racer",
            ObjectUpdate::merge(attrs(json!({"sold": true}))),
            &StoreOptions::default(),
        )
        .await
        .unwrap();
    store
        .delete("car", "racer", &StoreOptions::default())
        .await
        .unwrap();

    assert_eq!(
        recorder.kinds(),
        [
            ChangeKind::Add,
            ChangeKind::Update,
            ChangeKind::Update,
            ChangeKind::Remove
        ]
    );

    // The remove event carries the document as it was before deletion.
    let events = recorder.events();
    let removed = &events[3].document;
    assert_eq!(removed.get("color"), Some(&json!("blue")));
    assert_eq!(removed.get("sold"), Some(&json!(true)));
}

#[tokio::test]
async fn silent_operations_suppress_hooks() {
    let (store, _backend, recorder) = store_with_recorder();

    store
        .save(
            "car",
            Some("racer"),
            json!({"color": "red"}),
            &StoreOptions::silent(),
        )
        .await
        .unwrap();
    store
        .update(
            "car",
            "racer",
            ObjectUpdate::merge(attrs(json!({"sold": true}))),
            &StoreOptions::silent(),
        )
        .await
        .unwrap();
    store
        .delete("car", "racer", &StoreOptions::silent())
        .await
        .unwrap();

    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn a_failing_hook_does_not_fail_the_operation() {
    struct FailingHook {
        calls: AtomicUsize,
    }

    impl ChangeHook for FailingHook {
        fn on_change(&self, _event: &ChangeEvent) -> satchel::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("hook down").into())
        }
    }

    let backend = Arc::new(InMemory::new());
    let failing = Arc::new(FailingHook {
        calls: AtomicUsize::new(0),
    });
    let recorder = Arc::new(RecordingHook::default());
    let mut hooks = ChangeHookCollection::new();
    hooks.add_hook(failing.clone());
    hooks.add_hook(recorder.clone());
    let store = Store::with_hooks(backend, hooks);

    let saved = store
        .save(
            "car",
            Some("racer"),
            json!({"color": "red"}),
            &StoreOptions::default(),
        )
        .await
        .expect("Write must survive a failing hook");
    assert_eq!(saved.id, "racer");
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    // Later hooks still run after a failure.
    assert_eq!(recorder.kinds(), [ChangeKind::Add]);
}
