//! Key vocabulary accepted in property bags.

pub const NAME: &str = "NAME";
pub const METHOD: &str = "METHOD";
pub const DELETE: &str = "delete";
pub const METADATA: &str = "METADATA";
pub const CONFIGURATION: &str = "CONFIGURATION";

// Region pre-splitting
pub const SPLITS: &str = "SPLITS";
pub const SPLITS_FILE: &str = "SPLITS_FILE";
pub const NUMREGIONS: &str = "NUMREGIONS";
pub const SPLITALGO: &str = "SPLITALGO";

// Column family attributes
pub const BLOCKCACHE: &str = "BLOCKCACHE";
pub const REPLICATION_SCOPE: &str = "REPLICATION_SCOPE";
pub const CACHE_DATA_ON_WRITE: &str = "CACHE_DATA_ON_WRITE";
pub const CACHE_INDEX_ON_WRITE: &str = "CACHE_INDEX_ON_WRITE";
pub const CACHE_BLOOMS_ON_WRITE: &str = "CACHE_BLOOMS_ON_WRITE";
pub const EVICT_BLOCKS_ON_CLOSE: &str = "EVICT_BLOCKS_ON_CLOSE";
pub const IN_MEMORY: &str = "IN_MEMORY";
pub const IN_MEMORY_COMPACTION: &str = "IN_MEMORY_COMPACTION";
pub const TTL: &str = "TTL";
pub const DATA_BLOCK_ENCODING: &str = "DATA_BLOCK_ENCODING";
pub const BLOCKSIZE: &str = "BLOCKSIZE";
pub const VERSIONS: &str = "VERSIONS";
pub const MIN_VERSIONS: &str = "MIN_VERSIONS";
pub const KEEP_DELETED_CELLS: &str = "KEEP_DELETED_CELLS";
pub const COMPRESS_TAGS: &str = "COMPRESS_TAGS";
pub const PREFETCH_BLOCKS_ON_OPEN: &str = "PREFETCH_BLOCKS_ON_OPEN";
pub const IS_MOB: &str = "IS_MOB";
pub const MOB_THRESHOLD: &str = "MOB_THRESHOLD";
pub const MOB_COMPACT_PARTITION_POLICY: &str = "MOB_COMPACT_PARTITION_POLICY";
pub const NEW_VERSION_BEHAVIOR: &str = "NEW_VERSION_BEHAVIOR";
pub const BLOOMFILTER: &str = "BLOOMFILTER";
pub const COMPRESSION: &str = "COMPRESSION";
pub const COMPRESSION_COMPACT: &str = "COMPRESSION_COMPACT";
pub const ENCRYPTION: &str = "ENCRYPTION";
pub const ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
pub const STORAGE_POLICY: &str = "STORAGE_POLICY";
pub const DFS_REPLICATION: &str = "DFS_REPLICATION";

/// Every key the column family builder consumes.
pub const FAMILY_KEYS: &[&str] = &[
    NAME,
    BLOCKCACHE,
    REPLICATION_SCOPE,
    CACHE_DATA_ON_WRITE,
    CACHE_INDEX_ON_WRITE,
    CACHE_BLOOMS_ON_WRITE,
    EVICT_BLOCKS_ON_CLOSE,
    IN_MEMORY,
    IN_MEMORY_COMPACTION,
    TTL,
    DATA_BLOCK_ENCODING,
    BLOCKSIZE,
    VERSIONS,
    MIN_VERSIONS,
    KEEP_DELETED_CELLS,
    COMPRESS_TAGS,
    PREFETCH_BLOCKS_ON_OPEN,
    IS_MOB,
    MOB_THRESHOLD,
    MOB_COMPACT_PARTITION_POLICY,
    NEW_VERSION_BEHAVIOR,
    BLOOMFILTER,
    COMPRESSION,
    COMPRESSION_COMPACT,
    ENCRYPTION,
    ENCRYPTION_KEY,
    STORAGE_POLICY,
    DFS_REPLICATION,
    METADATA,
    CONFIGURATION,
];

// Table attributes
pub const OWNER: &str = "OWNER";
pub const MAX_FILESIZE: &str = "MAX_FILESIZE";
pub const READONLY: &str = "READONLY";
pub const COMPACTION_ENABLED: &str = "COMPACTION_ENABLED";
pub const NORMALIZATION_ENABLED: &str = "NORMALIZATION_ENABLED";
pub const MEMSTORE_FLUSHSIZE: &str = "MEMSTORE_FLUSHSIZE";
pub const DURABILITY: &str = "DURABILITY";
pub const PRIORITY: &str = "PRIORITY";
pub const FLUSH_POLICY: &str = "FLUSH_POLICY";
pub const REGION_MEMSTORE_REPLICATION: &str = "REGION_MEMSTORE_REPLICATION";
pub const SPLIT_POLICY: &str = "SPLIT_POLICY";
pub const REGION_REPLICATION: &str = "REGION_REPLICATION";

/// Scalar table attributes, all stored in the table's value map.
pub const TABLE_KEYS: &[&str] = &[
    OWNER,
    MAX_FILESIZE,
    READONLY,
    COMPACTION_ENABLED,
    NORMALIZATION_ENABLED,
    MEMSTORE_FLUSHSIZE,
    DURABILITY,
    PRIORITY,
    FLUSH_POLICY,
    REGION_MEMSTORE_REPLICATION,
    SPLIT_POLICY,
    REGION_REPLICATION,
];

/// Alter methods
pub const METHOD_TABLE_ATT: &str = "table_att";
pub const METHOD_TABLE_ATT_UNSET: &str = "table_att_unset";
pub const METHOD_TABLE_CONF_UNSET: &str = "table_conf_unset";
pub const METHOD_DELETE: &str = "delete";

/// Namespace methods
pub const METHOD_SET: &str = "set";
pub const METHOD_UNSET: &str = "unset";

/// Returns true for keys that register a coprocessor (`coprocessor`,
/// `COPROCESSOR$1`, ...).
pub fn is_coprocessor_key(key: &str) -> bool {
    key.trim().to_ascii_lowercase().contains("coprocessor")
}
