//! Document-store boundary for revdoc.
//!
//! This crate is the persistence seam: a narrow async contract
//! (`DocumentStore`) over a schema-less, revision-versioned document
//! store, plus an in-memory reference implementation for tests and
//! embedded use.
//!
//! It does not own object mapping (that's `revdoc-model`) and it does
//! not own querying — the contract is save/remove/get plus attachment
//! read/write, with optimistic concurrency carried by an opaque
//! revision token.

mod error;
mod memory;
pub mod revision;

pub use error::StoreError;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// Document field holding the store-assigned identifier.
pub const FIELD_ID: &str = "_id";
/// Document field holding the revision token.
pub const FIELD_REV: &str = "_rev";
/// Document field holding attachment metadata stubs.
pub const FIELD_ATTACHMENTS: &str = "_attachments";

/// Successful write acknowledgement: `{ok, id, rev}`.
///
/// `rev` is the token the next update or remove of this document must
/// carry for the store to accept it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveOutcome {
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

/// A named binary attachment to write onto an existing document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUpload {
    pub name: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Attachment metadata as it appears under `_attachments` in a fetched
/// document. The body itself is fetched separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentStub {
    pub content_type: String,
    pub length: u64,
}

/// The store contract consumed by the mapping layer.
///
/// Deliberately narrow: the mapping layer never queries, never parses
/// revision tokens, and never retries — it submits writes and forwards
/// whatever the store answers. Futures are `Send` so callers may fan
/// lookups out onto a runtime.
pub trait DocumentStore: Send + Sync {
    /// Create or update a document.
    ///
    /// With `id: None` the store assigns a fresh identifier. For an
    /// existing identifier, the document's `_rev` field must equal the
    /// stored revision or the save fails with [`StoreError::Conflict`].
    fn save(
        &self,
        id: Option<&str>,
        document: &Value,
    ) -> impl Future<Output = Result<SaveOutcome, StoreError>> + Send;

    /// Delete a document iff `rev` matches the stored revision.
    fn remove(
        &self,
        id: &str,
        rev: &str,
    ) -> impl Future<Output = Result<SaveOutcome, StoreError>> + Send;

    /// Fetch a document by identifier, with `_id`, `_rev`, and
    /// `_attachments` stubs injected.
    fn get(&self, id: &str) -> impl Future<Output = Result<Value, StoreError>> + Send;

    /// Write a named attachment onto an existing document, bumping its
    /// revision.
    fn save_attachment(
        &self,
        id: &str,
        upload: &AttachmentUpload,
    ) -> impl Future<Output = Result<SaveOutcome, StoreError>> + Send;

    /// Read a named attachment's body.
    fn get_attachment(
        &self,
        id: &str,
        name: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StoreError>> + Send;
}
