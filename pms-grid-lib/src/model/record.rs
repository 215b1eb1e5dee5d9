//! Dynamic JSON record row

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;

use super::TableRow;
use super::Value;

/// A row backed by a JSON object, for endpoints without a typed row struct.
///
/// The identifier is read from the `"id"` field; numbers and strings are
/// both accepted and compared by their text form. A record without an `id`
/// has the empty id, so several such records share one selection identity;
/// hosts that select rows must give every record an id.
///
/// # Example
///
/// ```
/// use pms_grid_lib::model::{Record, TableRow};
///
/// let record: Record = serde_json::from_str(r#"{"id": 7, "name": "Lift B"}"#).unwrap();
/// assert_eq!(record.id(), "7");
/// assert_eq!(record.field_text("name").as_deref(), Some("Lift B"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, serde_json::Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the record for chaining.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns the raw JSON value of a field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    /// Returns the field names in this record.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl From<Map<String, serde_json::Value>> for Record {
    fn from(fields: Map<String, serde_json::Value>) -> Self {
        Self { fields }
    }
}

impl TableRow for Record {
    type Id = String;

    fn id(&self) -> String {
        match self.fields.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn field(&self, key: &str) -> Option<Value> {
        self.fields.get(key).map(Value::from)
    }

    fn field_text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_missing_ids() {
        assert_eq!(Record::new().set("id", 42).id(), "42");
        assert_eq!(Record::new().set("name", "x").id(), "");
    }

    #[test]
    fn test_null_field_has_no_text() {
        let record = Record::new().set("notes", serde_json::Value::Null).set("floor", 3);
        assert_eq!(record.field_text("notes"), None);
        assert_eq!(record.field_text("floor").as_deref(), Some("3"));
        assert_eq!(record.field("missing"), None);
    }
}
