//! Entities: in-memory instances of a configured domain type.
//!
//! An entity is an open property map plus the storage envelope
//! (identifier, revision token, attachment metadata). Ad-hoc fields may
//! be set freely; only declared properties ever cross into storage
//! (the serializer is the gate). Relationships store identifiers, never
//! the related entity itself.

use crate::config::ModelConfig;
use crate::directory::Directory;
use crate::error::ModelError;
use crate::serialize;
use chrono::{DateTime, Utc};
use revdoc_store::{
    AttachmentStub, DocumentStore, FIELD_ATTACHMENTS, FIELD_ID, FIELD_REV, StoreError,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Declared property holding the first-save timestamp.
pub const DATE_CREATED: &str = "dateCreated";
/// Declared property refreshed on every save.
pub const LAST_UPDATED: &str = "lastUpdated";

/// The mutable state of one entity: envelope plus property map.
///
/// Split out from [`Entity`] so save hooks can work on state without
/// caring which store the entity is bound to.
#[derive(Debug, Clone, Default)]
pub struct EntityState {
    pub(crate) id: Option<String>,
    pub(crate) rev: Option<String>,
    pub(crate) properties: BTreeMap<String, Value>,
    pub(crate) attachments: BTreeMap<String, AttachmentStub>,
}

impl EntityState {
    /// The store-assigned identifier; `None` until the first save.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The last revision token received from the store.
    pub fn rev(&self) -> Option<&str> {
        self.rev.as_deref()
    }

    /// Read a property. Unset properties read as `None`.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Write a property. `Value::Null` clears, mirroring the store-side
    /// rendition of an unset field.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if value.is_null() {
            self.properties.remove(&name);
        } else {
            self.properties.insert(name, value);
        }
    }

    /// Clear a property.
    pub fn clear_property(&mut self, name: &str) {
        self.properties.remove(name);
    }

    /// Attachment metadata, populated when the entity was hydrated from
    /// a stored document carrying `_attachments` stubs.
    pub fn attachments(&self) -> &BTreeMap<String, AttachmentStub> {
        &self.attachments
    }
}

/// An entity bound to its configuration and a type directory.
pub struct Entity<S: DocumentStore> {
    pub(crate) state: EntityState,
    pub(crate) config: Arc<ModelConfig>,
    pub(crate) directory: Directory<S>,
}

impl<S: DocumentStore> Entity<S> {
    pub(crate) fn new(config: Arc<ModelConfig>, directory: Directory<S>) -> Self {
        Self {
            state: EntityState::default(),
            config,
            directory,
        }
    }

    /// Rebuild an entity from a fetched document: envelope split out,
    /// declared properties copied, attachment stubs captured.
    pub(crate) fn from_document(
        config: Arc<ModelConfig>,
        directory: Directory<S>,
        document: &Value,
    ) -> Result<Self, ModelError> {
        let Some(fields) = document.as_object() else {
            return Err(StoreError::InvalidDocument(
                "fetched document is not a JSON object".to_string(),
            )
            .into());
        };

        let mut state = EntityState {
            id: fields.get(FIELD_ID).and_then(Value::as_str).map(str::to_string),
            rev: fields.get(FIELD_REV).and_then(Value::as_str).map(str::to_string),
            ..EntityState::default()
        };
        for name in config.properties() {
            if let Some(value) = fields.get(name) {
                state.set_property(name.clone(), value.clone());
            }
        }
        if let Some(stubs) = fields.get(FIELD_ATTACHMENTS) {
            state.attachments = serde_json::from_value(stubs.clone())
                .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        }
        Ok(Self {
            state,
            config,
            directory,
        })
    }

    /// The type discriminator this entity serializes under.
    pub fn type_name(&self) -> &str {
        self.config.name()
    }

    pub fn id(&self) -> Option<&str> {
        self.state.id()
    }

    pub fn rev(&self) -> Option<&str> {
        self.state.rev()
    }

    /// Whether the store has assigned this entity an identifier.
    pub fn is_persisted(&self) -> bool {
        self.state.id.is_some()
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.state.property(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.state.set_property(name, value);
    }

    /// Mutable access to the full state, e.g. for tests and hooks.
    pub fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    pub fn date_created(&self) -> Option<DateTime<Utc>> {
        self.timestamp(DATE_CREATED)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.timestamp(LAST_UPDATED)
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.state
            .property(name)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }

    /// The store handle this entity persists through.
    pub fn store(&self) -> &S {
        self.directory.store()
    }

    /// Project the entity into its storage document: exactly the
    /// declared properties plus the `type`/`_id`/`_rev` envelope.
    pub fn serialize(&self) -> Value {
        serialize::to_document(&self.state, &self.config)
    }
}

impl<S: DocumentStore> fmt::Debug for Entity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.config.name())
            .field("state", &self.state)
            .finish()
    }
}
