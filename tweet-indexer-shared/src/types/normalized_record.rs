//! Normalized record types.
//!
//! A `NormalizedRecord` is the flat field mapping written to the search index for
//! one post. Fields are kept in name order so the written hash is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use crate::fields;

/// Value of a single record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text, tag lists and geo points are all stored as text.
    Text(String),
    /// Numeric field (the creation timestamp in nanoseconds).
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// Flat field mapping for one post, keyed by its identifier.
///
/// The `id` field is set at construction and cannot be removed, so every record
/// carries its own key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl NormalizedRecord {
    /// Create a record holding only its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(fields::ID.to_string(), FieldValue::Text(id.into()));
        Self { fields }
    }

    /// The record identifier.
    pub fn id(&self) -> &str {
        match self.fields.get(fields::ID) {
            Some(FieldValue::Text(id)) => id,
            _ => "",
        }
    }

    /// Set a field, replacing any previous value. The identifier is immutable.
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        if name == fields::ID {
            return;
        }
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render every field as a `(name, value)` string pair, ready for a flat hash write.
    pub fn to_field_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}
