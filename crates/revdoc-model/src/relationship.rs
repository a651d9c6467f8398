//! Relationship operations: single- and multi-reference accessors.
//!
//! Relationships are weak references by identifier. Setting or adding
//! requires the referenced entity to be persisted; resolution happens
//! through the directory at access time, with no caching — every get
//! re-fetches. Removing a referenced entity elsewhere leaves the
//! foreign key dangling; getters treat dangling keys as absent rather
//! than repairing them.

use crate::entity::Entity;
use crate::error::ModelError;
use revdoc_store::DocumentStore;
use serde_json::Value;
use tokio::task::JoinSet;

impl<S: DocumentStore> Entity<S> {
    /// Point a single reference at `target`, or clear it with `None`.
    ///
    /// Repeated sets overwrite — a single reference never accumulates.
    pub fn set_reference(
        &mut self,
        name: &str,
        target: Option<&Entity<S>>,
    ) -> Result<(), ModelError> {
        let spec = self.config.single_reference(name).ok_or_else(|| {
            ModelError::UnknownRelationship {
                model: self.config.name().to_string(),
                name: name.to_string(),
            }
        })?;
        let field = spec.field.clone();
        match target {
            Some(target) => {
                let id = target.id().ok_or_else(|| ModelError::UnpersistedReference {
                    relationship: name.to_string(),
                })?;
                self.state.set_property(field, Value::String(id.to_string()));
            }
            None => self.state.clear_property(&field),
        }
        Ok(())
    }

    /// Identifier currently held by a single reference.
    pub fn reference_id(&self, name: &str) -> Result<Option<String>, ModelError> {
        let spec = self.config.single_reference(name).ok_or_else(|| {
            ModelError::UnknownRelationship {
                model: self.config.name().to_string(),
                name: name.to_string(),
            }
        })?;
        Ok(self
            .state
            .property(&spec.field)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Resolve a single reference through the target type's finder.
    ///
    /// An unset foreign key resolves to `None` without touching the
    /// store; so does a dangling one (the referenced document is gone).
    pub async fn get_reference(&self, name: &str) -> Result<Option<Entity<S>>, ModelError> {
        let spec = self.config.single_reference(name).ok_or_else(|| {
            ModelError::UnknownRelationship {
                model: self.config.name().to_string(),
                name: name.to_string(),
            }
        })?;
        let Some(id) = self.state.property(&spec.field).and_then(Value::as_str) else {
            return Ok(None);
        };
        self.directory.find_by_id(&spec.target, id).await
    }

    /// Append `target`'s identifier to a multi reference.
    ///
    /// Idempotent on duplicates; insertion order is preserved.
    pub fn add_related(&mut self, plural: &str, target: &Entity<S>) -> Result<(), ModelError> {
        let spec = self.multi_spec(plural)?;
        let field = spec.field.clone();
        let id = target.id().ok_or_else(|| ModelError::UnpersistedReference {
            relationship: plural.to_string(),
        })?;
        let mut ids = self.id_list(&field);
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
        self.write_id_list(&field, ids);
        Ok(())
    }

    /// Drop the first occurrence of `target`'s identifier from a multi
    /// reference. Silent no-op when absent or when `target` was never
    /// persisted.
    pub fn remove_related(&mut self, plural: &str, target: &Entity<S>) -> Result<(), ModelError> {
        let spec = self.multi_spec(plural)?;
        let field = spec.field.clone();
        let Some(id) = target.id() else {
            return Ok(());
        };
        let mut ids = self.id_list(&field);
        if let Some(position) = ids.iter().position(|existing| existing == id) {
            ids.remove(position);
        }
        self.write_id_list(&field, ids);
        Ok(())
    }

    /// The current foreign-key list of a multi reference.
    pub fn related_ids(&self, plural: &str) -> Result<Vec<String>, ModelError> {
        let spec = self.multi_spec(plural)?;
        Ok(self.id_list(&spec.field))
    }

    /// Resolve every member of a multi reference.
    ///
    /// An empty list resolves immediately with no store traffic.
    /// Otherwise one lookup per identifier is dispatched concurrently
    /// and joined structurally: the call completes exactly once, after
    /// every lookup has finished. Members whose document no longer
    /// exists are skipped; any other store failure fails the whole join
    /// (remaining lookups are aborted). Completion order is not the
    /// identifier order.
    pub async fn get_related(&self, plural: &str) -> Result<Vec<Entity<S>>, ModelError>
    where
        S: 'static,
    {
        let spec = self.multi_spec(plural)?;
        let target = spec.target.clone();
        let ids = self.id_list(&spec.field);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut lookups = JoinSet::new();
        for id in ids {
            let directory = self.directory.clone();
            let target = target.clone();
            lookups.spawn(async move { directory.find_by_id(&target, &id).await });
        }

        let mut found = Vec::new();
        while let Some(joined) = lookups.join_next().await {
            let resolved = joined.map_err(|e| ModelError::Lookup(e.to_string()))??;
            if let Some(entity) = resolved {
                found.push(entity);
            }
        }
        Ok(found)
    }

    fn multi_spec(&self, plural: &str) -> Result<&crate::config::MultiReferenceSpec, ModelError> {
        self.config.multi_reference(plural).ok_or_else(|| {
            ModelError::UnknownRelationship {
                model: self.config.name().to_string(),
                name: plural.to_string(),
            }
        })
    }

    fn id_list(&self, field: &str) -> Vec<String> {
        self.state
            .property(field)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn write_id_list(&mut self, field: &str, ids: Vec<String>) {
        self.state.set_property(
            field.to_string(),
            Value::Array(ids.into_iter().map(Value::String).collect()),
        );
    }
}
