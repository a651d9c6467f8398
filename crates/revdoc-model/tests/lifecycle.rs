//! Lifecycle scenarios: save/remove against a recording store, hook
//! ordering, revision adoption, and detach semantics.

use revdoc_model::{
    AttachmentUpload, DirectoryBuilder, DocumentStore, MemoryStore, ModelConfig, ModelError,
    SaveOutcome, StoreError,
};
use serde_json::{Value, json};
use std::sync::Mutex;

/// Delegates to a `MemoryStore` while recording every submitted
/// document and counting remove calls.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    saved: Mutex<Vec<Value>>,
    removes: Mutex<usize>,
}

impl RecordingStore {
    fn last_saved(&self) -> Value {
        self.saved.lock().unwrap().last().cloned().expect("no document was saved")
    }

    fn remove_calls(&self) -> usize {
        *self.removes.lock().unwrap()
    }
}

impl DocumentStore for RecordingStore {
    async fn save(&self, id: Option<&str>, document: &Value) -> Result<SaveOutcome, StoreError> {
        self.saved.lock().unwrap().push(document.clone());
        self.inner.save(id, document).await
    }

    async fn remove(&self, id: &str, rev: &str) -> Result<SaveOutcome, StoreError> {
        *self.removes.lock().unwrap() += 1;
        self.inner.remove(id, rev).await
    }

    async fn get(&self, id: &str) -> Result<Value, StoreError> {
        self.inner.get(id).await
    }

    async fn save_attachment(
        &self,
        id: &str,
        upload: &AttachmentUpload,
    ) -> Result<SaveOutcome, StoreError> {
        self.inner.save_attachment(id, upload).await
    }

    async fn get_attachment(&self, id: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get_attachment(id, name).await
    }
}

fn user_config() -> ModelConfig {
    ModelConfig::new("User")
        .property("username")
        .property("firstName")
        .property("lastName")
}

fn directory() -> revdoc_model::Directory<RecordingStore> {
    DirectoryBuilder::new()
        .register(user_config())
        .build(RecordingStore::default())
}

#[tokio::test]
async fn first_save_submits_typed_document_and_adopts_identity() {
    let directory = directory();
    let mut user = directory.create("User").unwrap();
    user.set_property("username", json!("al"));
    user.set_property("firstName", json!("Al"));
    user.set_property("lastName", json!("B"));
    assert!(!user.is_persisted());

    let outcome = user.save().await.unwrap();

    let submitted = directory.store().last_saved();
    assert_eq!(submitted["type"], "User");
    assert_eq!(submitted["_id"], Value::Null);
    assert_eq!(submitted["username"], "al");
    assert!(submitted["dateCreated"].is_string());
    assert!(submitted["lastUpdated"].is_string());

    assert!(outcome.ok);
    assert_eq!(user.id(), Some(outcome.id.as_str()));
    assert_eq!(user.rev(), Some(outcome.rev.as_str()));
    assert!(user.date_created().is_some());
    assert!(user.last_updated().is_some());
}

#[tokio::test]
async fn second_save_keeps_identifier_and_date_created() {
    let directory = directory();
    let mut user = directory.create("User").unwrap();
    user.set_property("username", json!("al"));
    let first = user.save().await.unwrap();
    let created = user.date_created().unwrap();

    user.set_property("username", json!("albert"));
    let second = user.save().await.unwrap();

    assert_eq!(first.id, second.id);
    assert_ne!(first.rev, second.rev);
    assert_eq!(user.date_created().unwrap(), created);
}

#[tokio::test]
async fn before_save_hook_runs_before_the_store_sees_the_document() {
    let config = user_config().property("fullName").before_save(|state| {
        let first = state
            .property("firstName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let last = state
            .property("lastName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        state.set_property("fullName", json!(format!("{first} {last}")));
    });
    let directory = DirectoryBuilder::new()
        .register(config)
        .build(RecordingStore::default());

    let mut user = directory.create("User").unwrap();
    user.set_property("firstName", json!("Al"));
    user.set_property("lastName", json!("B"));
    user.save().await.unwrap();

    assert_eq!(directory.store().last_saved()["fullName"], "Al B");
    assert_eq!(user.property("fullName"), Some(&json!("Al B")));
}

#[tokio::test]
async fn after_save_hook_sees_the_store_outcome() {
    let config = user_config().after_save(|state, outcome| {
        state.set_property("lastOutcomeRev", json!(outcome.rev));
    });
    let directory = DirectoryBuilder::new()
        .register(config)
        .build(RecordingStore::default());

    let mut user = directory.create("User").unwrap();
    let outcome = user.save().await.unwrap();
    assert_eq!(user.property("lastOutcomeRev"), Some(&json!(outcome.rev)));
}

#[tokio::test]
async fn conflicting_save_forwards_the_store_error_untouched() {
    let directory = directory();
    let mut first = directory.create("User").unwrap();
    first.set_property("username", json!("al"));
    first.save().await.unwrap();

    let mut stale = directory
        .find_by_id("User", first.id().unwrap())
        .await
        .unwrap()
        .unwrap();

    // Advance the stored revision past the second handle's snapshot.
    first.save().await.unwrap();

    let stale_rev = stale.rev().unwrap().to_string();
    stale.set_property("username", json!("other"));
    let err = stale.save().await.unwrap_err();

    assert!(matches!(
        err,
        ModelError::Store(StoreError::Conflict { .. })
    ));
    assert_eq!(stale.rev(), Some(stale_rev.as_str()));
    assert_eq!(stale.id(), first.id());
}

#[tokio::test]
async fn remove_on_unpersisted_entity_never_contacts_the_store() {
    let directory = directory();
    let mut user = directory.create("User").unwrap();

    let outcome = user.remove().await.unwrap();
    assert!(outcome.is_none());
    assert_eq!(directory.store().remove_calls(), 0);
}

#[tokio::test]
async fn remove_detaches_and_a_later_save_creates_a_new_document() {
    let directory = directory();
    let mut user = directory.create("User").unwrap();
    user.set_property("username", json!("al"));
    let first = user.save().await.unwrap();

    let removed = user.remove().await.unwrap().unwrap();
    assert!(removed.ok);
    assert_eq!(user.id(), None);
    assert_eq!(user.rev(), None);

    let second = user.save().await.unwrap();
    assert_ne!(second.id, first.id);
    assert!(
        directory
            .find_by_id("User", &first.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn failed_remove_keeps_the_identifier_for_retry() {
    let directory = directory();
    let mut first = directory.create("User").unwrap();
    first.save().await.unwrap();

    let mut stale = directory
        .find_by_id("User", first.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    first.save().await.unwrap();

    let err = stale.remove().await.unwrap_err();
    assert!(matches!(
        err,
        ModelError::Store(StoreError::Conflict { .. })
    ));
    assert!(stale.is_persisted());

    // With the current revision the retry goes through.
    let mut current = directory
        .find_by_id("User", first.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(current.remove().await.unwrap().is_some());
}

#[tokio::test]
async fn round_trip_regenerates_the_same_declared_fields() {
    let directory = directory();
    let mut user = directory.create("User").unwrap();
    user.set_property("username", json!("al"));
    user.set_property("firstName", json!("Al"));
    user.save().await.unwrap();

    let reloaded = directory
        .find_by_id("User", user.id().unwrap())
        .await
        .unwrap()
        .unwrap();

    let mut original = user.serialize();
    let mut round_tripped = reloaded.serialize();
    for doc in [&mut original, &mut round_tripped] {
        let fields = doc.as_object_mut().unwrap();
        fields.remove("_rev");
        fields.remove("lastUpdated");
    }
    assert_eq!(original, round_tripped);
}
