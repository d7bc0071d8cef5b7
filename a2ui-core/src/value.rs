//! Wire-format value records and their decoding into data values.
//!
//! Data model updates carry their payload as a list of tagged records rather
//! than plain JSON:
//!
//! ```json
//! [
//!   { "key": "name", "valueString": "Ann" },
//!   { "key": "address", "valueMap": [{ "key": "city", "valueString": "Oslo" }] }
//! ]
//! ```
//!
//! A list holding exactly one record keyed `.` stands for the value itself
//! rather than an entry named `.`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A data model value. Keyed structures, sequences and scalars.
pub type DataValue = Value;

/// Key that makes a singleton record list replace its target.
pub const SELF_KEY: &str = ".";

/// One tagged entry of a data model update payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_map: Option<Vec<ValueRecord>>,
}

impl ValueRecord {
    /// Create a record with no value attached.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Create a text record.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value_string: Some(value.into()),
            ..Self::new(key)
        }
    }

    /// Create a numeric record.
    pub fn number(key: impl Into<String>, value: f64) -> Self {
        Self {
            value_number: Some(value),
            ..Self::new(key)
        }
    }

    /// Create a boolean record.
    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self {
            value_boolean: Some(value),
            ..Self::new(key)
        }
    }

    /// Create a nested record.
    pub fn map(key: impl Into<String>, entries: Vec<ValueRecord>) -> Self {
        Self {
            value_map: Some(entries),
            ..Self::new(key)
        }
    }

    /// Decode the single value this record carries.
    ///
    /// Precedence when a record carries several variants: string, number,
    /// boolean, map. Non-finite numbers are treated as absent.
    pub fn decode_value(&self) -> Option<DataValue> {
        if let Some(s) = &self.value_string {
            return Some(Value::String(s.clone()));
        }
        if let Some(n) = self.value_number {
            return Number::from_f64(n).map(Value::Number);
        }
        if let Some(b) = self.value_boolean {
            return Some(Value::Bool(b));
        }
        self.value_map.as_deref().and_then(decode)
    }
}

/// Decode a record list into a data value.
///
/// Returns `None` only for a lone `.` record that carries no value; every
/// other input decodes to a keyed structure, possibly empty.
pub fn decode(records: &[ValueRecord]) -> Option<DataValue> {
    if let [only] = records {
        if only.key == SELF_KEY {
            return only.decode_value();
        }
    }

    let mut map = Map::new();
    for record in records {
        if let Some(value) = record.decode_value() {
            map.insert(record.key.clone(), value);
        }
    }
    Some(Value::Object(map))
}
