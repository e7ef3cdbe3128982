//! Flattened state records

use serde::Serialize;
use std::collections::BTreeMap;

/// A coerced field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Null,
    String(String),
    Int(i64),
    Bool(bool),
    StringList(Vec<String>),
    StringMap(BTreeMap<String, String>),
    Record(FlatRecord),
    List(Vec<FlatRecord>),
}

impl FlatValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlatValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FlatValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlatValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FlatRecord]> {
        match self {
            FlatValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&FlatRecord> {
        match self {
            FlatValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FlatValue::Null)
    }

    /// Convert back into plain JSON
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FlatValue::Null => Value::Null,
            FlatValue::String(s) => Value::String(s.clone()),
            FlatValue::Int(i) => Value::from(*i),
            FlatValue::Bool(b) => Value::Bool(*b),
            FlatValue::StringList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FlatValue::StringMap(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            FlatValue::Record(r) => r.to_json(),
            FlatValue::List(items) => Value::Array(items.iter().map(FlatRecord::to_json).collect()),
        }
    }
}

impl From<&str> for FlatValue {
    fn from(s: &str) -> Self {
        FlatValue::String(s.to_string())
    }
}

impl From<String> for FlatValue {
    fn from(s: String) -> Self {
        FlatValue::String(s)
    }
}

impl From<i64> for FlatValue {
    fn from(i: i64) -> Self {
        FlatValue::Int(i)
    }
}

impl From<bool> for FlatValue {
    fn from(b: bool) -> Self {
        FlatValue::Bool(b)
    }
}

impl From<Vec<String>> for FlatValue {
    fn from(items: Vec<String>) -> Self {
        FlatValue::StringList(items)
    }
}

impl From<FlatRecord> for FlatValue {
    fn from(r: FlatRecord) -> Self {
        FlatValue::Record(r)
    }
}

impl From<Vec<FlatRecord>> for FlatValue {
    fn from(items: Vec<FlatRecord>) -> Self {
        FlatValue::List(items)
    }
}

/// Declared field name to coerced value.
///
/// Always rebuilt as a whole on read; callers replace the previous record
/// instead of merging into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlatRecord {
    fields: BTreeMap<String, FlatValue>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FlatValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FlatValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FlatValue> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlatValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FlatValue::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FlatValue::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FlatValue> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlatValue)> {
        self.fields.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, FlatValue)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (String, FlatValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
