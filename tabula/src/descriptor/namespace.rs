use super::name::validate_namespace;
use super::family::render_map;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDescriptor {
    pub name: String,
    #[serde(default)]
    pub configuration: BTreeMap<String, String>,
}

impl NamespaceDescriptor {
    pub fn new(name: &str) -> Result<Self> {
        validate_namespace(name)?;
        Ok(Self {
            name: name.to_string(),
            configuration: BTreeMap::new(),
        })
    }

    /// `None` removes the key.
    pub fn set(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(v) => {
                self.configuration.insert(key, v);
            }
            None => {
                self.configuration.remove(&key);
            }
        }
    }

    pub fn unset(&mut self, key: &str) -> Option<String> {
        self.configuration.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).map(String::as_str)
    }
}

impl fmt::Display for NamespaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.configuration.is_empty() {
            write!(f, "{{NAME => '{}'}}", self.name)
        } else {
            let inner = render_map(&self.configuration);
            write!(
                f,
                "{{NAME => '{}', {}}}",
                self.name,
                &inner[1..inner.len() - 1]
            )
        }
    }
}
