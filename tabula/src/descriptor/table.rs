use super::coprocessor::CoprocessorSpec;
use super::enums::{Durability, SchemaEnum};
use super::family::{render_map, ColumnFamilyDescriptor};
use super::name::TableName;
use crate::schema::keys;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// In-memory table schema.
///
/// Table-scoped scalars live in the value map under their reserved key
/// (`MAX_FILESIZE`, `DURABILITY`, ...) next to user metadata, so an unset
/// by key works the same for both. Typed accessors read them back. Values
/// and configuration keep the order keys were first written in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: TableName,
    #[serde(default)]
    families: Vec<ColumnFamilyDescriptor>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    values: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    configuration: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    coprocessors: Vec<CoprocessorSpec>,
}

impl TableDescriptor {
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            families: Vec::new(),
            values: IndexMap::new(),
            configuration: IndexMap::new(),
            coprocessors: Vec::new(),
        }
    }

    // -- families ----------------------------------------------------------

    pub fn families(&self) -> &[ColumnFamilyDescriptor] {
        &self.families
    }

    pub fn family_names(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn family(&self, name: &str) -> Option<&ColumnFamilyDescriptor> {
        self.families.iter().find(|f| f.name == name)
    }

    pub fn has_family(&self, name: &str) -> bool {
        self.family(name).is_some()
    }

    /// Insert a family, replacing one of the same name in place. Returns the
    /// replaced family.
    pub fn upsert_family(&mut self, family: ColumnFamilyDescriptor) -> Option<ColumnFamilyDescriptor> {
        match self.families.iter_mut().find(|f| f.name == family.name) {
            Some(slot) => Some(std::mem::replace(slot, family)),
            None => {
                self.families.push(family);
                None
            }
        }
    }

    pub fn remove_family(&mut self, name: &str) -> Option<ColumnFamilyDescriptor> {
        let idx = self.families.iter().position(|f| f.name == name)?;
        Some(self.families.remove(idx))
    }

    // -- values / metadata -------------------------------------------------

    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// `None` removes the key.
    pub fn set_value(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(v) => {
                self.values.insert(key, v);
            }
            None => {
                self.values.shift_remove(&key);
            }
        }
    }

    pub fn remove_value(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    /// User metadata: values whose keys are not reserved table attributes.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(k, _)| !keys::TABLE_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // -- configuration -----------------------------------------------------

    pub fn configuration(&self) -> &IndexMap<String, String> {
        &self.configuration
    }

    pub fn configuration_value(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).map(String::as_str)
    }

    /// `None` removes the key.
    pub fn set_configuration(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(v) => {
                self.configuration.insert(key, v);
            }
            None => {
                self.configuration.shift_remove(&key);
            }
        }
    }

    pub fn remove_configuration(&mut self, key: &str) -> Option<String> {
        self.configuration.shift_remove(key)
    }

    // -- coprocessors ------------------------------------------------------

    pub fn coprocessors(&self) -> &[CoprocessorSpec] {
        &self.coprocessors
    }

    pub fn has_coprocessor(&self, class_name: &str) -> bool {
        self.coprocessors.iter().any(|c| c.class_name == class_name)
    }

    /// Append a coprocessor. A class can only be attached once.
    pub fn add_coprocessor(&mut self, spec: CoprocessorSpec) -> Result<()> {
        if self.has_coprocessor(&spec.class_name) {
            return Err(Error::InvalidArgument(format!(
                "Coprocessor {} already exists on table {}",
                spec.class_name, self.name
            )));
        }
        self.coprocessors.push(spec);
        Ok(())
    }

    // -- typed table attributes ----------------------------------------------

    pub fn owner(&self) -> Option<&str> {
        self.value(keys::OWNER)
    }

    pub fn max_file_size(&self) -> Option<i64> {
        self.value(keys::MAX_FILESIZE).and_then(|v| v.parse().ok())
    }

    pub fn is_read_only(&self) -> bool {
        self.flag(keys::READONLY, false)
    }

    pub fn is_compaction_enabled(&self) -> bool {
        self.flag(keys::COMPACTION_ENABLED, true)
    }

    pub fn is_normalization_enabled(&self) -> bool {
        self.flag(keys::NORMALIZATION_ENABLED, false)
    }

    pub fn memstore_flush_size(&self) -> Option<i64> {
        self.value(keys::MEMSTORE_FLUSHSIZE).and_then(|v| v.parse().ok())
    }

    pub fn durability(&self) -> Durability {
        self.value(keys::DURABILITY)
            .and_then(|v| Durability::parse(keys::DURABILITY, v).ok())
            .unwrap_or_default()
    }

    pub fn priority(&self) -> i32 {
        self.value(keys::PRIORITY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn flush_policy(&self) -> Option<&str> {
        self.value(keys::FLUSH_POLICY)
    }

    pub fn has_region_memstore_replication(&self) -> bool {
        self.flag(keys::REGION_MEMSTORE_REPLICATION, true)
    }

    pub fn split_policy(&self) -> Option<&str> {
        self.value(keys::SPLIT_POLICY)
    }

    pub fn region_replication(&self) -> i32 {
        self.value(keys::REGION_REPLICATION)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.value(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    /// Shell-style table attribute summary (`describe` without families).
    pub fn attributes_summary(&self) -> String {
        let mut parts = Vec::new();
        for (k, v) in &self.values {
            parts.push(format!("{} => '{}'", k, v));
        }
        for (i, cp) in self.coprocessors.iter().enumerate() {
            parts.push(format!("coprocessor${} => '{}'", i + 1, cp));
        }
        if !self.configuration.is_empty() {
            parts.push(format!("CONFIGURATION => {}", render_map(&self.configuration)));
        }
        format!("{}, {{TABLE_ATTRIBUTES => {{{}}}}}", self.name, parts.join(", "))
    }
}

impl fmt::Display for TableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table {}", self.attributes_summary())?;
        writeln!(f, "COLUMN FAMILIES DESCRIPTION")?;
        for family in &self.families {
            writeln!(f, "{}", family)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableDescriptor {
        TableDescriptor::new(TableName::parse("t1").unwrap())
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut t = table();
        t.upsert_family(ColumnFamilyDescriptor::new("a"));
        t.upsert_family(ColumnFamilyDescriptor::new("b"));
        let mut a = ColumnFamilyDescriptor::new("a");
        a.max_versions = 5;
        let old = t.upsert_family(a).unwrap();
        assert_eq!(old.max_versions, 1);
        assert_eq!(t.family_names(), vec!["a", "b"]);
        assert_eq!(t.family("a").unwrap().max_versions, 5);
    }

    #[test]
    fn test_typed_attributes_read_value_map() {
        let mut t = table();
        assert_eq!(t.max_file_size(), None);
        assert!(t.is_compaction_enabled());
        t.set_value(keys::MAX_FILESIZE, Some("1073741824".into()));
        t.set_value(keys::DURABILITY, Some("ASYNC_WAL".into()));
        t.set_value(keys::COMPACTION_ENABLED, Some("false".into()));
        t.set_value("team", Some("search".into()));
        assert_eq!(t.max_file_size(), Some(1 << 30));
        assert_eq!(t.durability(), Durability::AsyncWal);
        assert!(!t.is_compaction_enabled());
        let meta: Vec<_> = t.metadata().collect();
        assert_eq!(meta, vec![("team", "search")]);
    }

    #[test]
    fn test_set_value_none_removes() {
        let mut t = table();
        t.set_value("k", Some("v".into()));
        t.set_value("k", None);
        assert!(t.value("k").is_none());
    }

    #[test]
    fn test_values_keep_write_order() {
        let mut t = table();
        t.set_value("zeta", Some("1".into()));
        t.set_value("alpha", Some("2".into()));
        t.set_value("mid", Some("3".into()));
        t.set_value("alpha", None);
        t.set_value("zeta", Some("4".into()));
        t.set_configuration("z.conf", Some("a".into()));
        t.set_configuration("a.conf", Some("b".into()));

        let keys: Vec<&str> = t.values().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "mid"]);
        assert_eq!(
            t.attributes_summary(),
            "t1, {TABLE_ATTRIBUTES => {zeta => '4', mid => '3', \
             CONFIGURATION => {'z.conf' => 'a', 'a.conf' => 'b'}}}"
        );

        let back: TableDescriptor = serde_yaml::from_str(&serde_yaml::to_string(&t).unwrap()).unwrap();
        let conf: Vec<&str> = back.configuration().keys().map(String::as_str).collect();
        assert_eq!(conf, vec!["z.conf", "a.conf"]);
    }

    #[test]
    fn test_duplicate_coprocessor_rejected() {
        let mut t = table();
        t.add_coprocessor(CoprocessorSpec::new("com.foo.Obs")).unwrap();
        assert!(t.add_coprocessor(CoprocessorSpec::new("com.foo.Obs")).is_err());
        assert_eq!(t.coprocessors().len(), 1);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut t = TableDescriptor::new(TableName::parse("ns:t").unwrap());
        t.upsert_family(ColumnFamilyDescriptor::new("cf"));
        t.set_configuration("hbase.hstore.blockingStoreFiles", Some("20".into()));
        let yaml = serde_yaml::to_string(&t).unwrap();
        let back: TableDescriptor = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, t);
    }
}
