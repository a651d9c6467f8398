//! Save/remove lifecycle against the document store.
//!
//! Per entity: `Unpersisted -> Persisted -> Detached`, with updates
//! looping on `Persisted`. The store's optimistic-concurrency check is
//! the only cross-process consistency mechanism; a stale-revision
//! rejection surfaces as an ordinary save failure and is never retried
//! here.

use crate::entity::{DATE_CREATED, Entity, LAST_UPDATED};
use crate::error::ModelError;
use chrono::{SecondsFormat, Utc};
use revdoc_store::{DocumentStore, SaveOutcome};
use serde_json::Value;

impl<S: DocumentStore> Entity<S> {
    /// Create or update this entity in the store.
    ///
    /// Runs the `before_save` hook, stamps `dateCreated` (first save
    /// only) and `lastUpdated` (every save), serializes, and submits.
    /// On success the store's identifier and revision are adopted and
    /// the `after_save` hook runs; on failure the error is forwarded
    /// and the entity's identity is left untouched.
    pub async fn save(&mut self) -> Result<SaveOutcome, ModelError> {
        if let Some(hook) = self.config.before_save_hook().cloned() {
            hook(&mut self.state);
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if self.state.property(DATE_CREATED).is_none() {
            self.state.set_property(DATE_CREATED, Value::String(now.clone()));
        }
        self.state.set_property(LAST_UPDATED, Value::String(now));

        let document = self.serialize();
        let outcome = self
            .directory
            .store()
            .save(self.state.id.as_deref(), &document)
            .await?;

        if outcome.ok {
            self.state.id = Some(outcome.id.clone());
            self.state.rev = Some(outcome.rev.clone());
        }
        if let Some(hook) = self.config.after_save_hook().cloned() {
            hook(&mut self.state, &outcome);
        }
        Ok(outcome)
    }

    /// Delete this entity from the store.
    ///
    /// Unpersisted entities resolve to `Ok(None)` without store
    /// contact. On success the entity detaches — identifier and
    /// revision are both cleared, so a later save creates a brand-new
    /// document. On failure the identifier stays intact and the remove
    /// can be retried.
    pub async fn remove(&mut self) -> Result<Option<SaveOutcome>, ModelError> {
        let Some(id) = self.state.id.clone() else {
            return Ok(None);
        };
        let rev = self
            .state
            .rev
            .clone()
            .ok_or_else(|| ModelError::MissingRevision(id.clone()))?;

        let outcome = self.directory.store().remove(&id, &rev).await?;
        self.state.id = None;
        self.state.rev = None;
        Ok(Some(outcome))
    }
}
