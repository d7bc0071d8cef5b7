//! Client-to-server user actions.
//!
//! Interactive components carry an action definition:
//!
//! ```json
//! { "name": "addToCart", "context": [{ "key": "sku", "value": { "path": "sku" } }] }
//! ```
//!
//! When the user triggers it, each context entry is resolved against the
//! surface's data model in the component's data context, producing a
//! [`UserAction`] the host sends back to the server.

use crate::binding::BoundValue;
use crate::data_model::DataModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An action as declared on a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default)]
    pub context: Vec<ActionContextEntry>,
}

/// One `{ key, value }` pair of an action's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContextEntry {
    pub key: String,
    pub value: Value,
}

impl ActionDefinition {
    /// Read an action definition out of a raw property value.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// A triggered action with its context bound to current data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub name: String,
    pub surface_id: String,
    pub source_component_id: String,
    pub timestamp: DateTime<Utc>,
    pub context: Map<String, Value>,
}

impl UserAction {
    /// Bind `action` against `data` in `context_path`.
    ///
    /// Bound values resolve path first, then literal; entries that resolve
    /// to nothing become `null`. Plain values are copied as they are.
    pub fn resolve(
        surface_id: impl Into<String>,
        source_component_id: impl Into<String>,
        action: &ActionDefinition,
        data: &DataModel,
        context_path: Option<&str>,
        legacy_prefixes: bool,
    ) -> Self {
        let context = action
            .context
            .iter()
            .map(|entry| {
                let value = match BoundValue::from_value(&entry.value) {
                    Some(bound) => bound
                        .resolve(data, context_path, legacy_prefixes)
                        .unwrap_or(Value::Null),
                    None => entry.value.clone(),
                };
                (entry.key.clone(), value)
            })
            .collect();

        Self {
            name: action.name.clone(),
            surface_id: surface_id.into(),
            source_component_id: source_component_id.into(),
            timestamp: Utc::now(),
            context,
        }
    }
}
