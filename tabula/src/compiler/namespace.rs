//! Namespace configuration edits.

use crate::descriptor::NamespaceDescriptor;
use crate::metrics;
use crate::schema::bag::{coerce_string, stringify};
use crate::schema::{keys, Arg, PropertyBag};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceChange {
    /// Pairs to merge; `None` removes the key
    Set(Vec<(String, Option<String>)>),
    Unset(String),
}

impl NamespaceChange {
    pub fn parse(arg: &Arg) -> Result<Self> {
        let bag = bag_only(arg)?;
        let method = bag
            .get(keys::METHOD)
            .ok_or_else(|| Error::MissingRequiredField(keys::METHOD.to_string()))?;
        let method = coerce_string(keys::METHOD, method)?;
        match method.as_str() {
            keys::METHOD_SET => Ok(NamespaceChange::Set(
                bag.iter()
                    .filter(|(k, _)| *k != keys::METHOD)
                    .map(|(k, v)| (k.to_string(), stringify(v)))
                    .collect(),
            )),
            keys::METHOD_UNSET => {
                let name = bag
                    .get(keys::NAME)
                    .ok_or_else(|| Error::MissingRequiredField(keys::NAME.to_string()))?;
                Ok(NamespaceChange::Unset(coerce_string(keys::NAME, name)?))
            }
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }

    pub fn apply_to(&self, ns: &mut NamespaceDescriptor) {
        match self {
            NamespaceChange::Set(pairs) => {
                for (k, v) in pairs {
                    ns.set(k.clone(), v.clone());
                }
            }
            NamespaceChange::Unset(key) => {
                ns.unset(key);
            }
        }
    }
}

fn bag_only(arg: &Arg) -> Result<&PropertyBag> {
    match arg {
        Arg::Bag(bag) => Ok(bag),
        Arg::Name(name) => Err(Error::InvalidArgument(format!(
            "Namespace arguments must be key/value pairs, got '{}'",
            name
        ))),
    }
}

/// Every pair of every bag becomes namespace configuration.
pub fn compile_create_namespace(name: &str, args: &[Arg]) -> Result<NamespaceDescriptor> {
    let result = create(name, args);
    metrics::record_compile("create_namespace", &result);
    result
}

fn create(name: &str, args: &[Arg]) -> Result<NamespaceDescriptor> {
    let mut ns = NamespaceDescriptor::new(name)?;
    for arg in args {
        for (k, v) in bag_only(arg)?.iter() {
            ns.set(k, stringify(v));
        }
    }
    Ok(ns)
}

/// Parse every bag first, then apply them in order to a copy of `current`.
pub fn compile_alter_namespace(
    current: &NamespaceDescriptor,
    args: &[Arg],
) -> Result<(NamespaceDescriptor, Vec<NamespaceChange>)> {
    let result = alter(current, args);
    metrics::record_compile("alter_namespace", &result);
    result
}

fn alter(
    current: &NamespaceDescriptor,
    args: &[Arg],
) -> Result<(NamespaceDescriptor, Vec<NamespaceChange>)> {
    let changes = args
        .iter()
        .map(NamespaceChange::parse)
        .collect::<Result<Vec<_>>>()?;
    let mut ns = current.clone();
    for change in &changes {
        change.apply_to(&mut ns);
    }
    Ok((ns, changes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> Arg {
        Arg::Bag(serde_json::from_value::<PropertyBag>(value).unwrap())
    }

    #[test]
    fn test_create_collects_all_pairs() {
        let ns = compile_create_namespace(
            "ns1",
            &[bag(json!({"a": 1})), bag(json!({"b": "two", "a": "one"}))],
        )
        .unwrap();
        assert_eq!(ns.get("a"), Some("one"));
        assert_eq!(ns.get("b"), Some("two"));
    }

    #[test]
    fn test_create_rejects_bare_strings() {
        assert!(matches!(
            compile_create_namespace("ns1", &["oops".into()]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_alter_set_then_unset() {
        let mut current = NamespaceDescriptor::new("ns1").unwrap();
        current.set("keep", Some("1".into()));
        current.set("drop", Some("2".into()));
        let (ns, changes) = compile_alter_namespace(
            &current,
            &[
                bag(json!({"METHOD": "set", "k": true})),
                bag(json!({"METHOD": "unset", "NAME": "drop"})),
            ],
        )
        .unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(ns.get("k"), Some("true"));
        assert_eq!(ns.get("keep"), Some("1"));
        assert_eq!(ns.get("drop"), None);
    }

    #[test]
    fn test_alter_errors() {
        let current = NamespaceDescriptor::new("ns1").unwrap();
        assert!(matches!(
            compile_alter_namespace(&current, &[bag(json!({"METHOD": "unset"}))]),
            Err(Error::MissingRequiredField(_))
        ));
        assert!(matches!(
            compile_alter_namespace(&current, &[bag(json!({"METHOD": "drop"}))]),
            Err(Error::UnknownMethod(_))
        ));
    }
}
