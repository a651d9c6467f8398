//! Type directory: the injected registry of configured domain types.
//!
//! Relationship targets are declared by type name and resolved through
//! the directory lazily, when an accessor actually runs — so mutually
//! referencing types can be registered in any order. The directory is
//! built once, bound to a store, and cloned cheaply into every entity
//! it creates.

use crate::config::ModelConfig;
use crate::entity::Entity;
use crate::error::ModelError;
use crate::serialize::FIELD_TYPE;
use revdoc_store::{DocumentStore, StoreError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Collects model configurations before binding them to a store.
#[derive(Debug, Default)]
pub struct DirectoryBuilder {
    types: BTreeMap<String, Arc<ModelConfig>>,
}

impl DirectoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Re-registering a name replaces the earlier
    /// configuration.
    pub fn register(mut self, config: ModelConfig) -> Self {
        self.types.insert(config.name().to_string(), Arc::new(config));
        self
    }

    /// Bind the registered types to a store.
    pub fn build<S: DocumentStore>(self, store: S) -> Directory<S> {
        Directory {
            inner: Arc::new(DirectoryInner {
                store,
                types: self.types,
            }),
        }
    }
}

struct DirectoryInner<S> {
    store: S,
    types: BTreeMap<String, Arc<ModelConfig>>,
}

/// The bound directory: type name -> configuration, plus the shared
/// store handle. Cloning shares the inner state.
pub struct Directory<S: DocumentStore> {
    inner: Arc<DirectoryInner<S>>,
}

impl<S: DocumentStore> Clone for Directory<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore> Directory<S> {
    /// The store every entity from this directory persists through.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Registered type names, in deterministic order.
    pub fn type_names(&self) -> Vec<String> {
        self.inner.types.keys().cloned().collect()
    }

    /// Configuration for one type name.
    pub fn config(&self, type_name: &str) -> Result<&Arc<ModelConfig>, ModelError> {
        self.inner
            .types
            .get(type_name)
            .ok_or_else(|| ModelError::UnknownType(type_name.to_string()))
    }

    /// Build a fresh, unpersisted entity of the given type.
    pub fn create(&self, type_name: &str) -> Result<Entity<S>, ModelError> {
        let config = Arc::clone(self.config(type_name)?);
        Ok(Entity::new(config, self.clone()))
    }

    /// The finder: fetch and hydrate one entity by identifier.
    ///
    /// Resolves to `None` when the document is absent or its `type`
    /// discriminator does not match the requested model; any other
    /// store failure is forwarded.
    pub async fn find_by_id(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Option<Entity<S>>, ModelError> {
        let config = Arc::clone(self.config(type_name)?);
        let document = match self.inner.store.get(id).await {
            Ok(document) => document,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if document.get(FIELD_TYPE).and_then(Value::as_str) != Some(config.name()) {
            return Ok(None);
        }
        Entity::from_document(config, self.clone(), &document).map(Some)
    }
}
