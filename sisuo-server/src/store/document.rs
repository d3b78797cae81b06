//! Document primitives shared by every store backend
//!
//! Filters, projections and updates are plain data so that each backend can
//! either translate them (JSONB containment, `body - text[]`) or evaluate them
//! in-process with the functions here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::StoreError;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Serialize a domain value into a document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

/// Decode a document into a domain value.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Conjunction of top-level field equalities. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a single field.
    pub fn by(field: &str, value: impl Into<Value>) -> Self {
        Self::new().and(field, value)
    }

    pub fn and(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    /// Filter as a JSON object, suitable for JSONB containment (`@>`).
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Read options. Only field exclusion is supported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    exclude: Vec<String>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `field` out of returned documents.
    pub fn exclude(mut self, field: &str) -> Self {
        self.exclude.push(field.to_owned());
        self
    }

    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    pub fn project(&self, mut doc: Document) -> Document {
        for field in &self.exclude {
            doc.remove(field);
        }
        doc
    }
}

/// Single-document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite a top-level field
    Set { field: String, value: Value },

    /// Append to an array field, creating it when absent
    Push { field: String, value: Value },

    /// Replace the first array element whose `key` equals `equals`
    SetElement {
        field: String,
        key: String,
        equals: Value,
        value: Value,
    },

    /// Remove the first array element whose `key` equals `equals`
    PullFirst {
        field: String,
        key: String,
        equals: Value,
    },
}

impl Update {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        Self::Set {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    pub fn push(field: &str, value: impl Into<Value>) -> Self {
        Self::Push {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    pub fn set_element(field: &str, key: &str, equals: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self::SetElement {
            field: field.to_owned(),
            key: key.to_owned(),
            equals: equals.into(),
            value: value.into(),
        }
    }

    pub fn pull_first(field: &str, key: &str, equals: impl Into<Value>) -> Self {
        Self::PullFirst {
            field: field.to_owned(),
            key: key.to_owned(),
            equals: equals.into(),
        }
    }

    /// Whether applying twice leaves the same document as applying once.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Self::Set { .. } | Self::SetElement { .. })
    }

    /// Apply to `doc` in place. Returns whether the document changed.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, StoreError> {
        match self {
            Self::Set { field, value } => {
                let changed = doc.get(field) != Some(value);
                doc.insert(field.clone(), value.clone());
                Ok(changed)
            }
            Self::Push { field, value } => {
                let slot = doc
                    .entry(field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                array_mut(field, slot)?.push(value.clone());
                Ok(true)
            }
            Self::SetElement {
                field,
                key,
                equals,
                value,
            } => {
                let Some(slot) = doc.get_mut(field) else {
                    return Ok(false);
                };
                let items = array_mut(field, slot)?;
                match position(items, key, equals) {
                    Some(i) => {
                        let changed = &items[i] != value;
                        items[i] = value.clone();
                        Ok(changed)
                    }
                    None => Ok(false),
                }
            }
            Self::PullFirst { field, key, equals } => {
                let Some(slot) = doc.get_mut(field) else {
                    return Ok(false);
                };
                let items = array_mut(field, slot)?;
                match position(items, key, equals) {
                    Some(i) => {
                        items.remove(i);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}

fn array_mut<'v>(field: &str, slot: &'v mut Value) -> Result<&'v mut Vec<Value>, StoreError> {
    match slot {
        Value::Array(items) => Ok(items),
        other => Err(StoreError::InvalidUpdate(format!(
            "field '{}' is a {}, not an array",
            field,
            json_kind(other)
        ))),
    }
}

fn position(items: &[Value], key: &str, equals: &Value) -> Option<usize> {
    items
        .iter()
        .position(|item| item.get(key) == Some(equals))
}

/// Outcome of `update_one`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}
