//! Model configuration: the declarative description of a domain type.
//!
//! A `ModelConfig` names the type's discriminator, its declared scalar
//! properties, and its relationships. Relationship foreign-key fields
//! (`<name>Id`, `<singular>Ids`) and the `dateCreated`/`lastUpdated`
//! timestamps are declared automatically, so the serializer needs no
//! special cases: everything that crosses into storage is a declared
//! property.

use crate::entity::EntityState;
use revdoc_store::SaveOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Runs against the mutable entity state before serialization, e.g. to
/// derive a stored field from other properties.
pub type BeforeSaveHook = Arc<dyn Fn(&mut EntityState) + Send + Sync>;

/// Runs after a successful store save, with the raw store outcome.
pub type AfterSaveHook = Arc<dyn Fn(&mut EntityState, &SaveOutcome) + Send + Sync>;

/// A "has one" declaration: one foreign-key scalar holding the related
/// entity's identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SingleReferenceSpec {
    pub name: String,
    pub target: String,
    /// The declared property carrying the foreign key: `<name>Id`.
    pub field: String,
}

/// A "has many" declaration: one foreign-key list holding related
/// identifiers in insertion order, set-like on add.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MultiReferenceSpec {
    pub plural: String,
    pub singular: String,
    pub target: String,
    /// The declared property carrying the foreign keys: `<singular>Ids`.
    pub field: String,
}

/// Declarative configuration for one domain type.
pub struct ModelConfig {
    name: String,
    properties: Vec<String>,
    has_one: Vec<SingleReferenceSpec>,
    has_many: Vec<MultiReferenceSpec>,
    before_save: Option<BeforeSaveHook>,
    after_save: Option<AfterSaveHook>,
}

impl ModelConfig {
    /// New configuration under the given type discriminator.
    pub fn new(name: impl Into<String>) -> Self {
        let mut config = Self {
            name: name.into(),
            properties: Vec::new(),
            has_one: Vec::new(),
            has_many: Vec::new(),
            before_save: None,
            after_save: None,
        };
        config.declare(crate::entity::DATE_CREATED);
        config.declare(crate::entity::LAST_UPDATED);
        config
    }

    /// Declare a scalar property. Idempotent; declaration order is kept.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.declare(&name.into());
        self
    }

    /// Declare a single reference named `name` targeting type `target`.
    pub fn has_one(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        let field = format!("{name}Id");
        self.declare(&field);
        self.has_one.push(SingleReferenceSpec {
            name,
            target: target.into(),
            field,
        });
        self
    }

    /// Declare a multi reference with the singular inferred by stripping
    /// one trailing `s` from `plural` (left unchanged when there is none).
    pub fn has_many(self, plural: impl Into<String>, target: impl Into<String>) -> Self {
        let plural = plural.into();
        let singular = plural
            .strip_suffix('s')
            .map(str::to_string)
            .unwrap_or_else(|| plural.clone());
        self.has_many_singular(plural, singular, target)
    }

    /// Declare a multi reference with an explicit singular name.
    pub fn has_many_singular(
        mut self,
        plural: impl Into<String>,
        singular: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let plural = plural.into();
        let singular = singular.into();
        let field = format!("{singular}Ids");
        self.declare(&field);
        self.has_many.push(MultiReferenceSpec {
            plural,
            singular,
            target: target.into(),
            field,
        });
        self
    }

    /// Install the pre-save hook.
    pub fn before_save(mut self, hook: impl Fn(&mut EntityState) + Send + Sync + 'static) -> Self {
        self.before_save = Some(Arc::new(hook));
        self
    }

    /// Install the post-save hook.
    pub fn after_save(
        mut self,
        hook: impl Fn(&mut EntityState, &SaveOutcome) + Send + Sync + 'static,
    ) -> Self {
        self.after_save = Some(Arc::new(hook));
        self
    }

    fn declare(&mut self, name: &str) {
        if !self.properties.iter().any(|p| p == name) {
            self.properties.push(name.to_string());
        }
    }

    /// The type discriminator stored under `type`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered, deduplicated set of declared property names.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Look up a single-reference declaration by relationship name.
    pub fn single_reference(&self, name: &str) -> Option<&SingleReferenceSpec> {
        self.has_one.iter().find(|spec| spec.name == name)
    }

    /// Look up a multi-reference declaration by its plural name.
    pub fn multi_reference(&self, plural: &str) -> Option<&MultiReferenceSpec> {
        self.has_many.iter().find(|spec| spec.plural == plural)
    }

    pub(crate) fn before_save_hook(&self) -> Option<&BeforeSaveHook> {
        self.before_save.as_ref()
    }

    pub(crate) fn after_save_hook(&self) -> Option<&AfterSaveHook> {
        self.after_save.as_ref()
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("has_one", &self.has_one)
            .field("has_many", &self.has_many)
            .field("before_save", &self.before_save.is_some())
            .field("after_save", &self.after_save.is_some())
            .finish()
    }
}
