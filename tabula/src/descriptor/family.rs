use super::enums::{
    BloomType, Compression, DataBlockEncoding, KeepDeletedCells, MemoryCompactionPolicy,
    MobCompactPartitionPolicy,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// TTL value meaning "never expire".
pub const FOREVER: i32 = i32::MAX;

pub const DEFAULT_VERSIONS: i32 = 1;
pub const DEFAULT_MIN_VERSIONS: i32 = 0;
pub const DEFAULT_BLOCKSIZE: i32 = 64 * 1024;
pub const DEFAULT_MOB_THRESHOLD: i64 = 100 * 1024;

/// Check a family name: non-empty, no leading `.`, no `:` and no control
/// characters.
pub fn validate_family_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument(
            "Column family name must not be empty".to_string(),
        ));
    }
    if name.starts_with('.') {
        return Err(Error::InvalidArgument(format!(
            "Column family name '{}' must not start with '.'",
            name
        )));
    }
    if name.chars().any(|c| c == ':' || c.is_control()) {
        return Err(Error::InvalidArgument(format!(
            "Column family name '{}' contains illegal characters",
            name
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFamilyDescriptor {
    pub name: String,
    pub block_cache_enabled: bool,
    pub replication_scope: i32,
    pub cache_data_on_write: bool,
    pub cache_index_on_write: bool,
    pub cache_blooms_on_write: bool,
    pub evict_blocks_on_close: bool,
    pub in_memory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_memory_compaction: Option<MemoryCompactionPolicy>,
    /// Seconds; [`FOREVER`] disables expiry
    pub ttl: i32,
    pub data_block_encoding: DataBlockEncoding,
    pub block_size: i32,
    pub max_versions: i32,
    pub min_versions: i32,
    pub keep_deleted_cells: KeepDeletedCells,
    pub compress_tags: bool,
    pub prefetch_blocks_on_open: bool,
    pub mob_enabled: bool,
    pub mob_threshold: i64,
    pub mob_compact_partition_policy: MobCompactPartitionPolicy,
    pub new_version_behavior: bool,
    pub bloom_filter: BloomType,
    pub compression: Compression,
    /// Compression used when compacting; falls back to `compression`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compaction_compression: Option<Compression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
    /// Data key wrapped under the cluster master key
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "super::serde_base64"
    )]
    pub encryption_key: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_policy: Option<String>,
    /// 0 means the filesystem default
    pub dfs_replication: i16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, String>,
}

impl Default for ColumnFamilyDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            block_cache_enabled: true,
            replication_scope: 0,
            cache_data_on_write: false,
            cache_index_on_write: false,
            cache_blooms_on_write: false,
            evict_blocks_on_close: false,
            in_memory: false,
            in_memory_compaction: None,
            ttl: FOREVER,
            data_block_encoding: DataBlockEncoding::None,
            block_size: DEFAULT_BLOCKSIZE,
            max_versions: DEFAULT_VERSIONS,
            min_versions: DEFAULT_MIN_VERSIONS,
            keep_deleted_cells: KeepDeletedCells::False,
            compress_tags: true,
            prefetch_blocks_on_open: false,
            mob_enabled: false,
            mob_threshold: DEFAULT_MOB_THRESHOLD,
            mob_compact_partition_policy: MobCompactPartitionPolicy::Daily,
            new_version_behavior: false,
            bloom_filter: BloomType::Row,
            compression: Compression::None,
            compaction_compression: None,
            encryption: None,
            encryption_key: None,
            storage_policy: None,
            dfs_replication: 0,
            metadata: BTreeMap::new(),
            configuration: BTreeMap::new(),
        }
    }
}

impl ColumnFamilyDescriptor {
    /// A family with default settings. Callers validate the name first.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn compaction_compression(&self) -> Compression {
        self.compaction_compression.unwrap_or(self.compression)
    }

    /// Shell-style attribute listing, in display order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("NAME", self.name.clone()),
            ("BLOOMFILTER", self.bloom_filter.to_string()),
            ("VERSIONS", self.max_versions.to_string()),
            ("IN_MEMORY", self.in_memory.to_string()),
            ("KEEP_DELETED_CELLS", self.keep_deleted_cells.to_string()),
            ("DATA_BLOCK_ENCODING", self.data_block_encoding.to_string()),
            ("TTL", format_ttl(self.ttl)),
            ("COMPRESSION", self.compression.to_string()),
            ("MIN_VERSIONS", self.min_versions.to_string()),
            ("BLOCKCACHE", self.block_cache_enabled.to_string()),
            ("BLOCKSIZE", self.block_size.to_string()),
            ("REPLICATION_SCOPE", self.replication_scope.to_string()),
        ];
        if let Some(policy) = self.in_memory_compaction {
            attrs.push(("IN_MEMORY_COMPACTION", policy.to_string()));
        }
        if let Some(compact) = self.compaction_compression {
            attrs.push(("COMPRESSION_COMPACT", compact.to_string()));
        }
        if self.mob_enabled {
            attrs.push(("IS_MOB", "true".to_string()));
            attrs.push(("MOB_THRESHOLD", self.mob_threshold.to_string()));
            attrs.push((
                "MOB_COMPACT_PARTITION_POLICY",
                self.mob_compact_partition_policy.to_string(),
            ));
        }
        if let Some(ref algo) = self.encryption {
            attrs.push(("ENCRYPTION", algo.clone()));
        }
        if let Some(ref policy) = self.storage_policy {
            attrs.push(("STORAGE_POLICY", policy.clone()));
        }
        if self.dfs_replication > 0 {
            attrs.push(("DFS_REPLICATION", self.dfs_replication.to_string()));
        }
        attrs
    }
}

impl fmt::Display for ColumnFamilyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .attributes()
            .into_iter()
            .map(|(k, v)| format!("{} => '{}'", k, v))
            .collect();
        write!(f, "{{{}", rendered.join(", "))?;
        if !self.metadata.is_empty() {
            write!(f, ", METADATA => {}", render_map(&self.metadata))?;
        }
        if !self.configuration.is_empty() {
            write!(f, ", CONFIGURATION => {}", render_map(&self.configuration))?;
        }
        f.write_str("}")
    }
}

pub(crate) fn render_map<'a>(map: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    let pairs: Vec<String> = map
        .into_iter()
        .map(|(k, v)| format!("'{}' => '{}'", k, v))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

/// `FOREVER`, or seconds followed by a human-readable breakdown.
pub fn format_ttl(ttl: i32) -> String {
    if ttl == FOREVER {
        return "FOREVER".to_string();
    }
    let mut rest = ttl.max(0) as i64;
    let days = rest / 86_400;
    rest %= 86_400;
    let hours = rest / 3_600;
    rest %= 3_600;
    let minutes = rest / 60;
    let seconds = rest % 60;

    let mut parts = Vec::new();
    for (n, unit) in [(days, "DAY"), (hours, "HOUR"), (minutes, "MINUTE"), (seconds, "SECOND")] {
        if n > 0 {
            parts.push(format!("{} {}{}", n, unit, if n == 1 { "" } else { "S" }));
        }
    }
    if days == 0 && hours == 0 && minutes == 0 {
        format!("{} SECONDS", ttl)
    } else {
        format!("{} SECONDS ({})", ttl, parts.join(" "))
    }
}
