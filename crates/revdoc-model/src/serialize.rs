//! Property serializer: the sole gate between entity state and storage.
//!
//! A pure projection — it never mutates the entity and never lets an
//! undeclared property cross into the document. Unset declared
//! properties serialize as `null`, the JSON rendition of "no value";
//! hydration treats `null` the same way, keeping round-trips stable.

use crate::config::ModelConfig;
use crate::entity::EntityState;
use revdoc_store::{FIELD_ID, FIELD_REV};
use serde_json::{Map, Value};

/// Document field holding the type discriminator.
pub const FIELD_TYPE: &str = "type";

/// Project `state` into a storage document under `config`'s declared
/// properties: exactly those properties plus `type`, `_id`, `_rev`.
pub fn to_document(state: &EntityState, config: &ModelConfig) -> Value {
    let mut doc = Map::new();
    for name in config.properties() {
        let value = state.property(name).cloned().unwrap_or(Value::Null);
        doc.insert(name.clone(), value);
    }
    doc.insert(
        FIELD_TYPE.to_string(),
        Value::String(config.name().to_string()),
    );
    doc.insert(
        FIELD_ID.to_string(),
        state.id().map(|id| Value::String(id.to_string())).unwrap_or(Value::Null),
    );
    doc.insert(
        FIELD_REV.to_string(),
        state.rev().map(|rev| Value::String(rev.to_string())).unwrap_or(Value::Null),
    );
    Value::Object(doc)
}
