//! Errors raised at the document-store boundary.

/// Failures reported by a [`DocumentStore`](crate::DocumentStore).
///
/// Conflicts are the store's optimistic-concurrency rejection: the
/// submitted revision token no longer matches the stored one. The
/// mapping layer forwards these verbatim — no retry, no merge.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("revision conflict for {id}: submitted {submitted:?}, current {current}")]
    Conflict {
        id: String,
        submitted: Option<String>,
        current: String,
    },

    #[error("attachment not found: {name} on {id}")]
    AttachmentNotFound { id: String, name: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Escape hatch for network-backed implementations.
    #[error("store backend error: {0}")]
    Backend(String),
}
