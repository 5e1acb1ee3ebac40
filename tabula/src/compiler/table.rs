//! Table-level attribute change sets.

use super::coerce::coerce_enum;
use super::SchemaWarning;
use crate::descriptor::{CoprocessorSpec, Durability, SchemaEnum, TableDescriptor};
use crate::schema::bag::{coerce_bool, coerce_i32, coerce_i64, coerce_string, coerce_string_map};
use crate::schema::{keys, PropertyBag};
use crate::Result;
use serde_json::Value;

/// Validated edits to table attributes, metadata, configuration and
/// coprocessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableChanges {
    /// Reserved attributes and user metadata; `None` removes the key
    pub values: Vec<(String, Option<String>)>,
    pub configuration: Vec<(String, Option<String>)>,
    pub coprocessors: Vec<CoprocessorSpec>,
}

impl TableChanges {
    /// Validate a table bag. `extra` lists keys the caller consumes itself
    /// (split keys on create, `METHOD` on alter) so they are not reported.
    pub fn parse(bag: &PropertyBag, extra: &[&str]) -> Result<(Self, Vec<SchemaWarning>)> {
        let mut changes = TableChanges::default();

        for &key in keys::TABLE_KEYS {
            if let Some(v) = bag.get(key) {
                let rendered = coerce_table_value(key, v)?;
                changes.values.push((key.to_string(), Some(rendered)));
            }
        }
        if let Some(v) = bag.get(keys::METADATA) {
            changes.values.extend(coerce_string_map(keys::METADATA, v)?);
        }
        if let Some(v) = bag.get(keys::CONFIGURATION) {
            changes.configuration = coerce_string_map(keys::CONFIGURATION, v)?;
        }

        let mut warnings = Vec::new();
        for (key, value) in bag.iter() {
            if keys::is_coprocessor_key(key) {
                let spec = coerce_string(key, value)?;
                changes.coprocessors.push(CoprocessorSpec::parse(&spec)?);
            } else if !is_table_key(key) && !extra.contains(&key) {
                warnings.push(SchemaWarning::UnknownTableKey {
                    key: key.to_string(),
                });
            }
        }

        Ok((changes, warnings))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.configuration.is_empty() && self.coprocessors.is_empty()
    }

    /// True when the bag did nothing but register coprocessors.
    pub fn only_coprocessors(&self) -> bool {
        !self.coprocessors.is_empty() && self.values.is_empty() && self.configuration.is_empty()
    }

    pub fn apply_to(&self, desc: &mut TableDescriptor) -> Result<()> {
        for (k, v) in &self.values {
            desc.set_value(k.clone(), v.clone());
        }
        for (k, v) in &self.configuration {
            desc.set_configuration(k.clone(), v.clone());
        }
        for spec in &self.coprocessors {
            desc.add_coprocessor(spec.clone())?;
        }
        Ok(())
    }
}

fn is_table_key(key: &str) -> bool {
    keys::TABLE_KEYS.contains(&key) || key == keys::METADATA || key == keys::CONFIGURATION
}

/// Validate a reserved table attribute and render it the way the value map
/// stores it.
fn coerce_table_value(key: &str, value: &Value) -> Result<String> {
    let rendered = match key {
        keys::MAX_FILESIZE | keys::MEMSTORE_FLUSHSIZE => coerce_i64(key, value)?.to_string(),
        keys::PRIORITY | keys::REGION_REPLICATION => coerce_i32(key, value)?.to_string(),
        keys::READONLY
        | keys::COMPACTION_ENABLED
        | keys::NORMALIZATION_ENABLED
        | keys::REGION_MEMSTORE_REPLICATION => coerce_bool(key, value)?.to_string(),
        keys::DURABILITY => coerce_enum::<Durability>(key, value)?.as_str().to_string(),
        _ => coerce_string(key, value)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TableName;
    use crate::Error;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> PropertyBag {
        serde_json::from_value(value).unwrap()
    }

    fn parse(value: serde_json::Value) -> Result<(TableChanges, Vec<SchemaWarning>)> {
        TableChanges::parse(&bag(value), &[])
    }

    #[test]
    fn test_scalars_are_normalized() {
        let (changes, warnings) = parse(json!({
            "MAX_FILESIZE": "1073741824",
            "READONLY": "TRUE",
            "DURABILITY": "async_wal"
        }))
        .unwrap();
        assert!(warnings.is_empty());
        let mut desc = TableDescriptor::new(TableName::parse("t1").unwrap());
        changes.apply_to(&mut desc).unwrap();
        assert_eq!(desc.value("MAX_FILESIZE"), Some("1073741824"));
        assert_eq!(desc.value("READONLY"), Some("true"));
        assert_eq!(desc.value("DURABILITY"), Some("ASYNC_WAL"));
        assert!(desc.is_read_only());
    }

    #[test]
    fn test_type_errors() {
        assert!(matches!(
            parse(json!({"MAX_FILESIZE": "big"})),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            parse(json!({"METADATA": "not a map"})),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            parse(json!({"DURABILITY": "NEVER"})),
            Err(Error::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn test_coprocessor_keys() {
        let (changes, _) = parse(json!({
            "coprocessor": "hdfs:///cp.jar|com.foo.Observer|1001|arg1=1"
        }))
        .unwrap();
        assert!(changes.only_coprocessors());
        assert_eq!(changes.coprocessors[0].class_name, "com.foo.Observer");
        assert_eq!(changes.coprocessors[0].priority, 1001);
    }

    #[test]
    fn test_unknown_and_extra_keys() {
        let (_, warnings) =
            TableChanges::parse(&bag(json!({"SPLITS": ["a"], "BOGUS": 1})), &[keys::SPLITS])
                .unwrap();
        assert_eq!(
            warnings,
            vec![SchemaWarning::UnknownTableKey { key: "BOGUS".into() }]
        );
    }

    #[test]
    fn test_null_metadata_removes() {
        let mut desc = TableDescriptor::new(TableName::parse("t1").unwrap());
        desc.set_value("team", Some("x".into()));
        let (changes, _) = parse(json!({"METADATA": {"team": null}})).unwrap();
        changes.apply_to(&mut desc).unwrap();
        assert!(desc.value("team").is_none());
    }
}
