//! # Revdoc model layer
//!
//! Object-to-document mapping over a revision-versioned, schema-less
//! document store. A domain type declares its scalar properties and
//! two relationship kinds — single reference ("has one") and multi
//! reference ("has many") — and gets a storage-ready entity: declared
//! properties projected through the serializer, foreign-key fields
//! managed by the relationship engine, and a save/remove lifecycle
//! speaking the store's optimistic-concurrency protocol.
//!
//! ## Architecture
//!
//! ```text
//! ModelConfig            ← declarative: properties, has_one, has_many, hooks
//!     │
//! Directory<S>           ← injected type registry bound to a DocumentStore
//!     │
//! Entity<S>              ← open property map + storage envelope
//!     ├─ serialize       ← sole gate into the stored document shape
//!     ├─ relationship    ← set/get single refs, add/remove/get multi refs
//!     ├─ lifecycle       ← save/remove with hooks and revision adoption
//!     └─ attachment      ← pass-through binary attachment I/O
//! ```
//!
//! This crate does not query, migrate, or cascade: relationships are
//! weak references by identifier, resolved lazily through the
//! directory, and dangling foreign keys read as absent.

pub mod attachment;
pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod relationship;
pub mod serialize;

pub use config::{
    AfterSaveHook, BeforeSaveHook, ModelConfig, MultiReferenceSpec, SingleReferenceSpec,
};
pub use directory::{Directory, DirectoryBuilder};
pub use entity::{DATE_CREATED, Entity, EntityState, LAST_UPDATED};
pub use error::ModelError;
pub use serialize::{FIELD_TYPE, to_document};

// The store boundary this layer is written against.
pub use revdoc_store::{
    AttachmentStub, AttachmentUpload, DocumentStore, MemoryStore, SaveOutcome, StoreError,
};
