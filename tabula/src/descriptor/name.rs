use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const SYSTEM_NAMESPACE: &str = "hbase";

fn namespace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid namespace regex"))
}

fn qualifier_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("valid qualifier regex"))
}

/// Check a namespace name.
pub fn validate_namespace(name: &str) -> Result<()> {
    if namespace_pattern().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "Illegal namespace name '{}': only [A-Za-z0-9_] allowed",
            name
        )))
    }
}

/// Namespaced table identity. The default namespace is implicit when
/// rendered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName {
    namespace: String,
    qualifier: String,
}

impl TableName {
    pub fn parse(name: &str) -> Result<Self> {
        let (namespace, qualifier) = match name.split_once(':') {
            Some((ns, q)) => (ns, q),
            None => (DEFAULT_NAMESPACE, name),
        };
        validate_namespace(namespace)?;
        if !qualifier_pattern().is_match(qualifier) {
            return Err(Error::InvalidArgument(format!(
                "Illegal table qualifier '{}' in '{}'",
                qualifier, name
            )));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            qualifier: qualifier.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn is_default_namespace(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_namespace() {
            f.write_str(&self.qualifier)
        } else {
            write!(f, "{}:{}", self.namespace, self.qualifier)
        }
    }
}

impl TryFrom<String> for TableName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TableName::parse(&value)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.to_string()
    }
}

impl std::str::FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TableName::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace_is_implicit() {
        let name = TableName::parse("t1").unwrap();
        assert_eq!(name.namespace(), "default");
        assert_eq!(name.to_string(), "t1");
        assert_eq!(TableName::parse("default:t1").unwrap(), name);
    }

    #[test]
    fn test_explicit_namespace() {
        let name = TableName::parse("ns1:events.v2").unwrap();
        assert_eq!(name.namespace(), "ns1");
        assert_eq!(name.qualifier(), "events.v2");
        assert_eq!(name.to_string(), "ns1:events.v2");
    }

    #[test]
    fn test_illegal_names() {
        assert!(TableName::parse("").is_err());
        assert!(TableName::parse("ns-1:t").is_err());
        assert!(TableName::parse(".hidden").is_err());
        assert!(TableName::parse("a:b:c").is_err());
        assert!(TableName::parse("t 1").is_err());
    }
}
