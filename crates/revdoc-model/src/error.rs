//! Errors raised by the mapping layer.
//!
//! One typed contract for every failure: relationship misuse,
//! attachment validation, and store rejections all surface as `Err`
//! values. Store errors pass through verbatim — the mapping layer
//! delivers them, it never remediates.

use revdoc_store::StoreError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The directory holds no configuration under this type name.
    #[error("unknown model type: {0}")]
    UnknownType(String),

    /// No relationship with this name is declared on the model.
    #[error("unknown relationship {name} on {model}")]
    UnknownRelationship { model: String, name: String },

    /// Only persisted entities may be referenced.
    #[error("cannot reference an unpersisted entity through {relationship}")]
    UnpersistedReference { relationship: String },

    /// The operation needs an identifier the entity does not have yet.
    #[error("entity of type {0} has not been persisted")]
    NotPersisted(String),

    /// A persisted entity lost its revision token; the store cannot be
    /// asked to remove it.
    #[error("persisted entity {0} is missing its revision token")]
    MissingRevision(String),

    /// A required attachment field was empty. Checked independently, in
    /// a fixed order: name, then contentType, then body.
    #[error("attachment {0} not specified")]
    AttachmentField(&'static str),

    #[error("document has no attachments")]
    NoAttachments,

    #[error("document is missing attachment {name}")]
    AttachmentMissing { name: String },

    /// The fan-out join itself failed (a lookup task panicked or was
    /// cancelled), as opposed to a store error from one lookup.
    #[error("relationship lookup failed: {0}")]
    Lookup(String),
}
