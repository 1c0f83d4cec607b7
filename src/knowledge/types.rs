use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::errors::AppError;

/// The grounding data handed to the model on every query.
///
/// All three collections are always present after a load, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub rules: Vec<Record>,
    #[serde(default)]
    pub items: Vec<Record>,
}

/// A donation drop-off point.
///
/// The known fields take any scalar (numbers and booleans become text, `null`
/// becomes empty). Keys outside the known set are kept in `extra` so a load
/// followed by a save leaves them in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub accepted_items: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hours: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: String,
    #[serde(flatten)]
    pub extra: Record,
}

/// Schema-free entry used for `rules` and `items`. Keys stay sorted so the
/// serialized form is stable.
pub type Record = BTreeMap<String, RecordValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<RecordValue>),
    Nested(Record),
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_text)
}

/// A list of scalars, a single scalar, or `null`.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(values) => values.into_iter().map(value_to_text).collect(),
        other => vec![value_to_text(other)],
    })
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        RecordValue::Text(value.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(value: String) -> Self {
        RecordValue::Text(value)
    }
}

impl From<i64> for RecordValue {
    fn from(value: i64) -> Self {
        RecordValue::Integer(value)
    }
}

impl From<bool> for RecordValue {
    fn from(value: bool) -> Self {
        RecordValue::Bool(value)
    }
}

/// A partial knowledge base. Every provided collection replaces the current
/// one wholesale; omitted collections are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Record>>,
}

impl KnowledgeUpdate {
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(format!("Invalid knowledge update: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_none() && self.rules.is_none() && self.items.is_none()
    }

    /// Each record carried by the update, serialized on its own, in
    /// `locations`, `rules`, `items` order.
    pub fn records(&self) -> Result<Vec<Value>, AppError> {
        let mut records = Vec::new();
        for location in self.locations.iter().flatten() {
            records.push(serde_json::to_value(location)?);
        }
        for record in self.rules.iter().flatten().chain(self.items.iter().flatten()) {
            records.push(serde_json::to_value(record)?);
        }
        Ok(records)
    }
}

impl KnowledgeBase {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.rules.is_empty() && self.items.is_empty()
    }

    /// Shallow top-level merge.
    pub fn update(&mut self, partial: KnowledgeUpdate) -> &KnowledgeBase {
        if let Some(locations) = partial.locations {
            self.locations = locations;
        }
        if let Some(rules) = partial.rules {
            self.rules = rules;
        }
        if let Some(items) = partial.items {
            self.items = items;
        }
        self
    }

    /// Pretty JSON with two-space indentation. Non-ASCII text is written as is.
    pub fn to_pretty_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
