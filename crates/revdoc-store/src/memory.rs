//! In-memory reference store.
//!
//! Implements the full [`DocumentStore`] contract with CouchDB-style
//! optimistic concurrency: every write re-mints the revision token and
//! every update or remove must present the current one. Used by the
//! test suites and embeddable wherever a real store is overkill.

use crate::{
    AttachmentStub, AttachmentUpload, DocumentStore, FIELD_ATTACHMENTS, FIELD_ID, FIELD_REV,
    SaveOutcome, StoreError, revision,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Attachment {
    content_type: String,
    body: Vec<u8>,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    rev: String,
    body: Map<String, Value>,
    attachments: BTreeMap<String, Attachment>,
}

/// Thread-safe in-memory document store.
///
/// Attachments live beside the document body, so re-saving a document
/// does not drop previously written attachments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredDocument>> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save_inner(&self, id: Option<&str>, document: &Value) -> Result<SaveOutcome, StoreError> {
        let Some(submitted) = document.as_object() else {
            return Err(StoreError::InvalidDocument(
                "document body must be a JSON object".to_string(),
            ));
        };

        // Envelope fields are carried separately by the store.
        let mut body = submitted.clone();
        body.remove(FIELD_ID);
        let submitted_rev = match body.remove(FIELD_REV) {
            Some(Value::String(rev)) => Some(rev),
            _ => None,
        };
        body.remove(FIELD_ATTACHMENTS);

        let payload = serde_json::to_vec(&body)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;

        let mut docs = self.lock();
        let id = match id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };

        let rev = match docs.get(&id) {
            Some(existing) => {
                if submitted_rev.as_deref() != Some(existing.rev.as_str()) {
                    return Err(StoreError::Conflict {
                        id,
                        submitted: submitted_rev,
                        current: existing.rev.clone(),
                    });
                }
                revision::next(Some(&existing.rev), &payload)
            }
            None => revision::next(None, &payload),
        };

        let attachments = docs
            .remove(&id)
            .map(|existing| existing.attachments)
            .unwrap_or_default();
        docs.insert(
            id.clone(),
            StoredDocument {
                rev: rev.clone(),
                body,
                attachments,
            },
        );
        Ok(SaveOutcome { ok: true, id, rev })
    }

    fn remove_inner(&self, id: &str, rev: &str) -> Result<SaveOutcome, StoreError> {
        let mut docs = self.lock();
        let Some(existing) = docs.get(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        if existing.rev != rev {
            return Err(StoreError::Conflict {
                id: id.to_string(),
                submitted: Some(rev.to_string()),
                current: existing.rev.clone(),
            });
        }
        let tombstone = revision::next(Some(&existing.rev), id.as_bytes());
        docs.remove(id);
        Ok(SaveOutcome {
            ok: true,
            id: id.to_string(),
            rev: tombstone,
        })
    }

    fn get_inner(&self, id: &str) -> Result<Value, StoreError> {
        let docs = self.lock();
        let Some(existing) = docs.get(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        let mut body = existing.body.clone();
        body.insert(FIELD_ID.to_string(), Value::String(id.to_string()));
        body.insert(FIELD_REV.to_string(), Value::String(existing.rev.clone()));
        if !existing.attachments.is_empty() {
            let mut stubs = Map::new();
            for (name, attachment) in &existing.attachments {
                let stub = AttachmentStub {
                    content_type: attachment.content_type.clone(),
                    length: attachment.body.len() as u64,
                };
                let value = serde_json::to_value(stub)
                    .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
                stubs.insert(name.clone(), value);
            }
            body.insert(FIELD_ATTACHMENTS.to_string(), Value::Object(stubs));
        }
        Ok(Value::Object(body))
    }

    fn save_attachment_inner(
        &self,
        id: &str,
        upload: &AttachmentUpload,
    ) -> Result<SaveOutcome, StoreError> {
        let mut docs = self.lock();
        let Some(existing) = docs.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        let mut payload = upload.name.clone().into_bytes();
        payload.push(0);
        payload.extend_from_slice(&upload.body);
        let rev = revision::next(Some(&existing.rev), &payload);

        existing.attachments.insert(
            upload.name.clone(),
            Attachment {
                content_type: upload.content_type.clone(),
                body: upload.body.clone(),
            },
        );
        existing.rev = rev.clone();
        Ok(SaveOutcome {
            ok: true,
            id: id.to_string(),
            rev,
        })
    }

    fn get_attachment_inner(&self, id: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let docs = self.lock();
        let Some(existing) = docs.get(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        existing
            .attachments
            .get(name)
            .map(|attachment| attachment.body.clone())
            .ok_or_else(|| StoreError::AttachmentNotFound {
                id: id.to_string(),
                name: name.to_string(),
            })
    }
}

impl DocumentStore for MemoryStore {
    async fn save(&self, id: Option<&str>, document: &Value) -> Result<SaveOutcome, StoreError> {
        self.save_inner(id, document)
    }

    async fn remove(&self, id: &str, rev: &str) -> Result<SaveOutcome, StoreError> {
        self.remove_inner(id, rev)
    }

    async fn get(&self, id: &str) -> Result<Value, StoreError> {
        self.get_inner(id)
    }

    async fn save_attachment(
        &self,
        id: &str,
        upload: &AttachmentUpload,
    ) -> Result<SaveOutcome, StoreError> {
        self.save_attachment_inner(id, upload)
    }

    async fn get_attachment(&self, id: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        self.get_attachment_inner(id, name)
    }
}
