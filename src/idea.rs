//! Idea records
//!
//! An idea is one JSON object from the queue file. Only `text` is interpreted;
//! every other field is carried through untouched so that rewrites of the queue
//! and archive entries reproduce the record as it was written.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A queued post idea
///
/// Equality is structural over the whole record. Two ideas with the same
/// fields and values are the same idea regardless of key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Idea {
    fields: Map<String, Value>,
}

impl Idea {
    /// Build a minimal idea carrying only `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::String(text.into()));
        Self { fields }
    }

    /// Build an idea from an arbitrary JSON value.
    ///
    /// Fails unless the value is an object with a string `text` field.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(format!("expected a JSON object, found {}", kind(&other))),
        };
        match fields.get("text") {
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(other) => Err(format!("`text` must be a string, found {}", kind(other))),
            None => Err("missing `text` field".to_string()),
        }
    }

    /// Parse one queue line.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
        Self::from_value(value)
    }

    /// The raw idea text sent to the generation service.
    pub fn text(&self) -> &str {
        self.fields
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// All fields of the record, including `text`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Serialize as a single queue line (no trailing newline).
    pub fn to_line(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl<'de> Deserialize<'de> for Idea {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Idea::from_value(value).map_err(serde::de::Error::custom)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
