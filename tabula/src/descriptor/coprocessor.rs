//! Coprocessor attachment specs: `[jar path]|class|[priority]|[k1=v1,k2=v2]`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Priority assigned to user coprocessors when none is given.
pub const PRIORITY_USER: i32 = 1_073_741_823;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoprocessorSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_path: Option<String>,
    pub class_name: String,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl CoprocessorSpec {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            jar_path: None,
            class_name: class_name.into(),
            priority: PRIORITY_USER,
            properties: BTreeMap::new(),
        }
    }

    /// Parse a spec string. A string without `|` is taken as a bare class
    /// name.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(Error::InvalidArgument(
                "Coprocessor spec must not be empty".to_string(),
            ));
        }
        if !spec.contains('|') {
            return Ok(Self::new(spec));
        }

        let mut parts = spec.splitn(4, '|');
        let jar_path = parts.next().map(str::trim).unwrap_or_default();
        let class_name = parts.next().map(str::trim).unwrap_or_default();
        let priority = parts.next().map(str::trim).unwrap_or_default();
        let properties = parts.next().map(str::trim).unwrap_or_default();

        if class_name.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "Coprocessor spec '{}' does not name a class",
                spec
            )));
        }

        let priority = if priority.is_empty() {
            PRIORITY_USER
        } else {
            priority.parse::<i32>().map_err(|_| {
                Error::InvalidArgument(format!(
                    "Coprocessor spec '{}' has an invalid priority '{}'",
                    spec, priority
                ))
            })?
        };

        let mut props = BTreeMap::new();
        for pair in properties.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Coprocessor property '{}' must be written as key=value",
                    pair
                ))
            })?;
            props.insert(k.trim().to_string(), v.trim().to_string());
        }

        Ok(Self {
            jar_path: (!jar_path.is_empty()).then(|| jar_path.to_string()),
            class_name: class_name.to_string(),
            priority,
            properties: props,
        })
    }
}

impl fmt::Display for CoprocessorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props: Vec<String> = self
            .properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(
            f,
            "{}|{}|{}|{}",
            self.jar_path.as_deref().unwrap_or(""),
            self.class_name,
            self.priority,
            props.join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_spec() {
        let spec =
            CoprocessorSpec::parse("hdfs:///foo.jar|com.foo.FooRegionObserver|1001|arg1=1,arg2=2")
                .unwrap();
        assert_eq!(spec.jar_path.as_deref(), Some("hdfs:///foo.jar"));
        assert_eq!(spec.class_name, "com.foo.FooRegionObserver");
        assert_eq!(spec.priority, 1001);
        assert_eq!(spec.properties.get("arg2").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_defaults() {
        let spec = CoprocessorSpec::parse("|com.foo.Observer||").unwrap();
        assert!(spec.jar_path.is_none());
        assert_eq!(spec.priority, PRIORITY_USER);
        assert!(spec.properties.is_empty());

        let bare = CoprocessorSpec::parse(" com.foo.Observer ").unwrap();
        assert_eq!(bare.class_name, "com.foo.Observer");
    }

    #[test]
    fn test_parse_rejects_missing_class_and_bad_priority() {
        assert!(matches!(
            CoprocessorSpec::parse("foo.jar||1|"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(CoprocessorSpec::parse("foo.jar|Cls|high|").is_err());
        assert!(CoprocessorSpec::parse("foo.jar|Cls|1|novalue").is_err());
    }

    #[test]
    fn test_display_reparses() {
        let spec = CoprocessorSpec::parse("a.jar|Cls|5|k=v").unwrap();
        assert_eq!(spec.to_string(), "a.jar|Cls|5|k=v");
        assert_eq!(CoprocessorSpec::parse(&spec.to_string()).unwrap(), spec);
    }
}
