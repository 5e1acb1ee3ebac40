//! Strongly typed schema descriptors for tables, column families and
//! namespaces.

pub mod coprocessor;
pub mod enums;
pub mod family;
pub mod name;
pub mod namespace;
pub mod table;

pub use coprocessor::{CoprocessorSpec, PRIORITY_USER};
pub use enums::{
    BloomType, Compression, DataBlockEncoding, Durability, KeepDeletedCells,
    MemoryCompactionPolicy, MobCompactPartitionPolicy, SchemaEnum,
};
pub use family::{validate_family_name, ColumnFamilyDescriptor, FOREVER};
pub use name::{validate_namespace, TableName, DEFAULT_NAMESPACE, SYSTEM_NAMESPACE};
pub use namespace::NamespaceDescriptor;
pub use table::TableDescriptor;

/// Optional byte strings stored as base64 text.
pub(crate) mod serde_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
