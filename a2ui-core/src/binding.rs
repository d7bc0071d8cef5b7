//! Binding expressions inside component property bags.
//!
//! Each raw property value is classified once into a [`BindingExpr`]:
//!
//! | Shape                                        | Expression            |
//! |----------------------------------------------|-----------------------|
//! | `{ "path": "...", ... }`                     | `Path`                |
//! | string under `child` / `*Child`              | `Child`               |
//! | `{ "explicitList": [ids] }`                  | `Array(Explicit)`     |
//! | `{ "template": { componentId, dataBinding } }` | `Array(Template)`   |
//! | any other object                             | `Structure`           |
//! | any other array                              | `Sequence`            |
//! | scalars                                      | `Literal`             |

use crate::data_model::DataModel;
use crate::path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference to the children of a container component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayRef {
    /// Fixed, ordered list of component ids.
    Explicit(Vec<String>),
    /// One instance of `component_id` per element of a bound collection.
    Template {
        component_id: String,
        data_binding: String,
    },
}

/// A classified property value.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingExpr {
    /// Passed through unchanged.
    Literal(Value),
    /// Read from the data model.
    Path(String),
    /// Another component rendered in place.
    Child(String),
    /// A list of child components.
    Array(ArrayRef),
    /// A nested object walked entry by entry.
    Structure(Vec<(String, BindingExpr)>),
    /// A nested array walked element by element.
    Sequence(Vec<BindingExpr>),
}

impl BindingExpr {
    /// Classify a raw value. `key` is the property name it sits under, if any.
    pub fn classify(key: Option<&str>, value: &Value) -> Self {
        match value {
            Value::String(id) if key.is_some_and(is_child_key) => Self::Child(id.clone()),
            Value::Object(map) => Self::classify_object(map),
            Value::Array(items) => {
                Self::Sequence(items.iter().map(|item| Self::classify(None, item)).collect())
            }
            scalar => Self::Literal(scalar.clone()),
        }
    }

    fn classify_object(map: &Map<String, Value>) -> Self {
        if let Some(Value::String(path)) = map.get("path") {
            return Self::Path(path.clone());
        }
        if let Some(Value::Array(ids)) = map.get("explicitList") {
            let ids = ids
                .iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect();
            return Self::Array(ArrayRef::Explicit(ids));
        }
        if let Some(Value::Object(template)) = map.get("template") {
            let component_id = template.get("componentId").and_then(Value::as_str);
            let data_binding = template.get("dataBinding").and_then(Value::as_str);
            if let (Some(component_id), Some(data_binding)) = (component_id, data_binding) {
                return Self::Array(ArrayRef::Template {
                    component_id: component_id.to_string(),
                    data_binding: data_binding.to_string(),
                });
            }
        }
        Self::Structure(
            map.iter()
                .map(|(key, value)| (key.clone(), Self::classify(Some(key), value)))
                .collect(),
        )
    }
}

/// Whether a property holds a single child component id.
pub fn is_child_key(key: &str) -> bool {
    key == "child" || key.ends_with("Child")
}

/// A bound value: an optional data path with an optional literal fallback.
///
/// `{ "literalString": "Hi" }`, `{ "path": "/name" }` and
/// `{ "path": "/name", "literalString": "Anonymous" }` are all bound values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_boolean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Value>,
}

impl BoundValue {
    /// Read a bound value out of a raw property. Non-objects and objects with
    /// none of the known keys yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let bound: Self = serde_json::from_value(value.clone()).ok()?;
        (bound != Self::default()).then_some(bound)
    }

    /// A path-only binding.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// A text literal.
    pub fn string(literal: impl Into<String>) -> Self {
        Self {
            literal_string: Some(literal.into()),
            ..Self::default()
        }
    }

    /// The literal fallback, checked in order: string, number, boolean, raw.
    pub fn literal_value(&self) -> Option<Value> {
        if let Some(s) = &self.literal_string {
            return Some(Value::String(s.clone()));
        }
        if let Some(n) = self.literal_number {
            return serde_json::Number::from_f64(n).map(Value::Number);
        }
        if let Some(b) = self.literal_boolean {
            return Some(Value::Bool(b));
        }
        self.literal.clone()
    }

    /// Resolve against a data model: a present value at `path` wins, then
    /// the literal.
    pub fn resolve(
        &self,
        data: &DataModel,
        context: Option<&str>,
        legacy_prefixes: bool,
    ) -> Option<Value> {
        if let Some(raw) = &self.path {
            let absolute = path::resolve_binding(raw, context, legacy_prefixes);
            if let Some(value) = data.get(&absolute) {
                return Some(value.clone());
            }
        }
        self.literal_value()
    }
}
