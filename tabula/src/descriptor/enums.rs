//! Closed value sets for enum-typed descriptor fields.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An enumeration whose members are addressed by upper-case names.
pub trait SchemaEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn names() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.as_str()).collect()
    }

    /// Upper-case `raw` and match it against the legal names. The error
    /// names `field` and lists every legal value.
    fn parse(field: &str, raw: &str) -> Result<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.as_str() == upper)
            .ok_or_else(|| Error::invalid_enum(field, upper, &Self::names()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloomType {
    None,
    #[default]
    Row,
    Rowcol,
    RowprefixFixedLength,
}

impl SchemaEnum for BloomType {
    const VARIANTS: &'static [Self] = &[
        BloomType::None,
        BloomType::Row,
        BloomType::Rowcol,
        BloomType::RowprefixFixedLength,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            BloomType::None => "NONE",
            BloomType::Row => "ROW",
            BloomType::Rowcol => "ROWCOL",
            BloomType::RowprefixFixedLength => "ROWPREFIX_FIXED_LENGTH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compression {
    #[default]
    None,
    Gz,
    Lzo,
    Snappy,
    Lz4,
    Bzip2,
    Zstd,
}

impl SchemaEnum for Compression {
    const VARIANTS: &'static [Self] = &[
        Compression::None,
        Compression::Gz,
        Compression::Lzo,
        Compression::Snappy,
        Compression::Lz4,
        Compression::Bzip2,
        Compression::Zstd,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "NONE",
            Compression::Gz => "GZ",
            Compression::Lzo => "LZO",
            Compression::Snappy => "SNAPPY",
            Compression::Lz4 => "LZ4",
            Compression::Bzip2 => "BZIP2",
            Compression::Zstd => "ZSTD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataBlockEncoding {
    #[default]
    None,
    Prefix,
    Diff,
    FastDiff,
    RowIndexV1,
}

impl SchemaEnum for DataBlockEncoding {
    const VARIANTS: &'static [Self] = &[
        DataBlockEncoding::None,
        DataBlockEncoding::Prefix,
        DataBlockEncoding::Diff,
        DataBlockEncoding::FastDiff,
        DataBlockEncoding::RowIndexV1,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            DataBlockEncoding::None => "NONE",
            DataBlockEncoding::Prefix => "PREFIX",
            DataBlockEncoding::Diff => "DIFF",
            DataBlockEncoding::FastDiff => "FAST_DIFF",
            DataBlockEncoding::RowIndexV1 => "ROW_INDEX_V1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeepDeletedCells {
    #[default]
    False,
    True,
    Ttl,
}

impl SchemaEnum for KeepDeletedCells {
    const VARIANTS: &'static [Self] = &[
        KeepDeletedCells::False,
        KeepDeletedCells::True,
        KeepDeletedCells::Ttl,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            KeepDeletedCells::False => "FALSE",
            KeepDeletedCells::True => "TRUE",
            KeepDeletedCells::Ttl => "TTL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryCompactionPolicy {
    None,
    Basic,
    Eager,
    Adaptive,
}

impl SchemaEnum for MemoryCompactionPolicy {
    const VARIANTS: &'static [Self] = &[
        MemoryCompactionPolicy::None,
        MemoryCompactionPolicy::Basic,
        MemoryCompactionPolicy::Eager,
        MemoryCompactionPolicy::Adaptive,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            MemoryCompactionPolicy::None => "NONE",
            MemoryCompactionPolicy::Basic => "BASIC",
            MemoryCompactionPolicy::Eager => "EAGER",
            MemoryCompactionPolicy::Adaptive => "ADAPTIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MobCompactPartitionPolicy {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl SchemaEnum for MobCompactPartitionPolicy {
    const VARIANTS: &'static [Self] = &[
        MobCompactPartitionPolicy::Daily,
        MobCompactPartitionPolicy::Weekly,
        MobCompactPartitionPolicy::Monthly,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            MobCompactPartitionPolicy::Daily => "DAILY",
            MobCompactPartitionPolicy::Weekly => "WEEKLY",
            MobCompactPartitionPolicy::Monthly => "MONTHLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Durability {
    #[default]
    UseDefault,
    SkipWal,
    AsyncWal,
    SyncWal,
    FsyncWal,
}

impl SchemaEnum for Durability {
    const VARIANTS: &'static [Self] = &[
        Durability::UseDefault,
        Durability::SkipWal,
        Durability::AsyncWal,
        Durability::SyncWal,
        Durability::FsyncWal,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Durability::UseDefault => "USE_DEFAULT",
            Durability::SkipWal => "SKIP_WAL",
            Durability::AsyncWal => "ASYNC_WAL",
            Durability::SyncWal => "SYNC_WAL",
            Durability::FsyncWal => "FSYNC_WAL",
        }
    }
}

impl fmt::Display for BloomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DataBlockEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for KeepDeletedCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MemoryCompactionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MobCompactPartitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(BloomType::parse("BLOOMFILTER", "rowcol").unwrap(), BloomType::Rowcol);
        assert_eq!(Compression::parse("COMPRESSION", " Snappy ").unwrap(), Compression::Snappy);
        assert_eq!(Durability::parse("DURABILITY", "async_wal").unwrap(), Durability::AsyncWal);
    }

    #[test]
    fn test_unknown_value_lists_legal_set() {
        let err = Compression::parse("COMPRESSION", "brotli").unwrap_err();
        assert_eq!(
            err.to_string(),
            "COMPRESSION BROTLI is not supported. Use one of NONE GZ LZO SNAPPY LZ4 BZIP2 ZSTD"
        );
    }

    #[test]
    fn test_serde_names_match_schema_names() {
        for v in DataBlockEncoding::VARIANTS {
            let yaml = serde_yaml::to_string(v).unwrap();
            assert_eq!(yaml.trim(), v.as_str());
        }
        for v in BloomType::VARIANTS {
            let yaml = serde_yaml::to_string(v).unwrap();
            assert_eq!(yaml.trim(), v.as_str());
        }
    }
}
