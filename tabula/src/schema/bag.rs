//! Property bags: the loosely typed records operators hand to create/alter.
//!
//! A bag keeps its keys in the order they were written so that anything
//! order-sensitive (coprocessor registration, warnings) is reproducible.

use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A single create/alter argument: either a bare family name or a bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Name(String),
    Bag(PropertyBag),
}

impl Arg {
    pub fn name(name: impl Into<String>) -> Self {
        Arg::Name(name.into())
    }
}

impl From<PropertyBag> for Arg {
    fn from(bag: PropertyBag) -> Self {
        Arg::Bag(bag)
    }
}

impl From<&str> for Arg {
    fn from(name: &str) -> Self {
        Arg::Name(name.to_string())
    }
}

/// Insertion-ordered key/value record. Later writes of the same key
/// overwrite the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, Value)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Keys not accepted by `recognized`, in bag order.
    pub fn unrecognized<F>(&self, recognized: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.keys()
            .filter(|k| !recognized(k))
            .map(|k| k.to_string())
            .collect()
    }
}

impl FromIterator<(String, Value)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BagVisitor;

        impl<'de> Visitor<'de> for BagVisitor {
            type Value = PropertyBag;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property keys to values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<PropertyBag, A::Error> {
                let mut bag = PropertyBag::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    bag.insert(key, value);
                }
                Ok(bag)
            }
        }

        deserializer.deserialize_map(BagVisitor)
    }
}

// ---------------------------------------------------------------------------
// Scalar coercions
// ---------------------------------------------------------------------------

/// Accepts `true`/`false` as booleans or (case-insensitive) strings.
pub fn coerce_bool(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(Error::invalid_type(field, "boolean", other)),
    }
}

/// Accepts integer numbers and integer strings.
pub fn coerce_i64(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::invalid_type(field, "integer", value)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::invalid_type(field, "integer", value)),
        other => Err(Error::invalid_type(field, "integer", other)),
    }
}

pub fn coerce_i32(field: &str, value: &Value) -> Result<i32> {
    let wide = coerce_i64(field, value)?;
    i32::try_from(wide).map_err(|_| Error::invalid_type(field, "32-bit integer", value))
}

/// Strings pass through; numbers and booleans are rendered.
pub fn coerce_string(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::invalid_type(field, "string", other)),
    }
}

/// A single string or a list of strings.
pub fn coerce_string_list(field: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(|v| coerce_string(field, v)).collect(),
        other => Ok(vec![coerce_string(field, other)?]),
    }
}

/// Map values rendered as strings; `null` means "remove this key".
pub fn coerce_string_map(field: &str, value: &Value) -> Result<Vec<(String, Option<String>)>> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), stringify(v)))
            .collect()),
        other => Err(Error::invalid_type(field, "map", other)),
    }
}

/// Render a value the way descriptor maps store it.
pub fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
