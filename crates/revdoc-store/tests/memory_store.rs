//! Contract tests for the in-memory store: create/update/remove with
//! optimistic concurrency, plus the attachment round-trip.

use revdoc_store::{
    AttachmentUpload, DocumentStore, FIELD_ATTACHMENTS, FIELD_ID, FIELD_REV, MemoryStore,
    StoreError, revision,
};
use serde_json::json;

#[tokio::test]
async fn create_assigns_identifier_and_first_revision() {
    let store = MemoryStore::new();
    let outcome = store
        .save(None, &json!({"type": "user", "username": "al"}))
        .await
        .unwrap();

    assert!(outcome.ok);
    assert!(!outcome.id.is_empty());
    assert_eq!(revision::generation(&outcome.rev), 1);
}

#[tokio::test]
async fn create_honors_explicit_identifier() {
    let store = MemoryStore::new();
    let outcome = store.save(Some("user-1"), &json!({"a": 1})).await.unwrap();
    assert_eq!(outcome.id, "user-1");

    let fetched = store.get("user-1").await.unwrap();
    assert_eq!(fetched[FIELD_ID], "user-1");
    assert_eq!(fetched[FIELD_REV], outcome.rev.as_str());
    assert_eq!(fetched["a"], 1);
}

#[tokio::test]
async fn update_requires_matching_revision() {
    let store = MemoryStore::new();
    let created = store.save(Some("doc"), &json!({"n": 1})).await.unwrap();

    let updated = store
        .save(Some("doc"), &json!({"n": 2, FIELD_REV: created.rev}))
        .await
        .unwrap();
    assert_eq!(revision::generation(&updated.rev), 2);

    let err = store
        .save(Some("doc"), &json!({"n": 3, FIELD_REV: created.rev}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
}

#[tokio::test]
async fn update_without_revision_conflicts() {
    let store = MemoryStore::new();
    store.save(Some("doc"), &json!({"n": 1})).await.unwrap();

    let err = store.save(Some("doc"), &json!({"n": 2})).await.unwrap_err();
    match err {
        StoreError::Conflict { id, submitted, .. } => {
            assert_eq!(id, "doc");
            assert_eq!(submitted, None);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn remove_checks_revision_then_deletes() {
    let store = MemoryStore::new();
    let created = store.save(Some("doc"), &json!({"n": 1})).await.unwrap();

    let err = store.remove("doc", "9-stale").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let removed = store.remove("doc", &created.rev).await.unwrap();
    assert!(removed.ok);
    assert!(matches!(
        store.get("doc").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(matches!(
        store.remove("doc", &removed.rev).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn non_object_document_is_rejected() {
    let store = MemoryStore::new();
    let err = store.save(None, &json!(["not", "an", "object"])).await;
    assert!(matches!(err, Err(StoreError::InvalidDocument(_))));
}

#[tokio::test]
async fn attachment_round_trip_bumps_revision() {
    let store = MemoryStore::new();
    let created = store.save(Some("doc"), &json!({"n": 1})).await.unwrap();

    let upload = AttachmentUpload {
        name: "avatar".to_string(),
        content_type: "image/png".to_string(),
        body: vec![1, 2, 3],
    };
    let outcome = store.save_attachment("doc", &upload).await.unwrap();
    assert_eq!(revision::generation(&outcome.rev), 2);
    assert_ne!(outcome.rev, created.rev);

    let body = store.get_attachment("doc", "avatar").await.unwrap();
    assert_eq!(body, vec![1, 2, 3]);

    let fetched = store.get("doc").await.unwrap();
    let stub = &fetched[FIELD_ATTACHMENTS]["avatar"];
    assert_eq!(stub["contentType"], "image/png");
    assert_eq!(stub["length"], 3);
}

#[tokio::test]
async fn attachments_survive_document_update() {
    let store = MemoryStore::new();
    let created = store.save(Some("doc"), &json!({"n": 1})).await.unwrap();
    let upload = AttachmentUpload {
        name: "notes".to_string(),
        content_type: "text/plain".to_string(),
        body: b"hello".to_vec(),
    };
    let attached = store.save_attachment("doc", &upload).await.unwrap();
    assert_ne!(attached.rev, created.rev);

    store
        .save(Some("doc"), &json!({"n": 2, FIELD_REV: attached.rev}))
        .await
        .unwrap();
    assert_eq!(
        store.get_attachment("doc", "notes").await.unwrap(),
        b"hello".to_vec()
    );
}

#[tokio::test]
async fn attachment_errors_are_distinguished() {
    let store = MemoryStore::new();
    let upload = AttachmentUpload {
        name: "a".to_string(),
        content_type: "text/plain".to_string(),
        body: vec![0],
    };
    assert!(matches!(
        store.save_attachment("missing", &upload).await.unwrap_err(),
        StoreError::NotFound(_)
    ));

    store.save(Some("doc"), &json!({})).await.unwrap();
    assert!(matches!(
        store.get_attachment("doc", "absent").await.unwrap_err(),
        StoreError::AttachmentNotFound { .. }
    ));
}
