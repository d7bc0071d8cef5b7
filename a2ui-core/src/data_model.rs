//! Per-surface nested data store.
//!
//! The model is a single keyed structure addressed with the paths described
//! in [`crate::path`]. Reads return `None` for anything that cannot be
//! reached; writes never fail and silently skip impossible assignments.

use crate::path::normalize;
use crate::value::DataValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Path-addressable nested value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataModel {
    root: DataValue,
}

impl Default for DataModel {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }
}

impl DataModel {
    /// Create an empty data model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole model as one value.
    pub fn root(&self) -> &DataValue {
        &self.root
    }

    /// Reset to an empty keyed structure.
    pub fn clear(&mut self) {
        self.root = Value::Object(Map::new());
    }

    /// Read the value at `path`.
    pub fn get(&self, path: &str) -> Option<&DataValue> {
        normalize(path)
            .iter()
            .try_fold(&self.root, |current, segment| step(current, segment))
    }

    /// Read a text value.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Read a numeric value.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    /// Read a boolean value.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Read a sequence.
    pub fn get_array(&self, path: &str) -> Option<&Vec<DataValue>> {
        self.get(path)?.as_array()
    }

    /// Write `value` at `path`.
    ///
    /// Missing or scalar intermediates become empty keyed structures. Writing
    /// a keyed structure at the root merges its top-level keys; any other
    /// value at the root is ignored.
    pub fn set(&mut self, path: &str, value: DataValue) {
        let segments = normalize(path);
        let Some((last, parents)) = segments.split_last() else {
            self.merge_root(value);
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            match step_or_create(current, segment) {
                Some(next) => current = next,
                None => {
                    debug!(path, segment = segment.as_str(), "Skipping data write through sequence");
                    return;
                }
            }
        }

        match current {
            Value::Object(map) => {
                map.insert(last.clone(), value);
            }
            Value::Array(items) => match last.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                Some(slot) => *slot = value,
                None => debug!(path, "Skipping out-of-range sequence write"),
            },
            _ => debug!(path, "Skipping write into scalar data model root"),
        }
    }

    fn merge_root(&mut self, value: DataValue) {
        match value {
            Value::Object(entries) => {
                if !self.root.is_object() {
                    self.root = Value::Object(Map::new());
                }
                if let Value::Object(root) = &mut self.root {
                    root.extend(entries);
                }
            }
            other => debug!(value = %other, "Ignoring non-structure write at data model root"),
        }
    }
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Descend one segment for a write, creating keyed structures as needed.
///
/// Always yields a container so the caller can keep walking or assign.
fn step_or_create<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    let next = match current {
        Value::Object(map) => map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new())),
        Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
        _ => return None,
    };
    if !matches!(next, Value::Object(_) | Value::Array(_)) {
        *next = Value::Object(Map::new());
    }
    Some(next)
}
