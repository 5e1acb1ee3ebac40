//! Column family change sets.

use super::coerce::{coerce_enum, coerce_keep_deleted, coerce_ttl};
use super::{CompileContext, SchemaWarning};
use crate::descriptor::{
    validate_family_name, BloomType, ColumnFamilyDescriptor, Compression, DataBlockEncoding,
    KeepDeletedCells, MemoryCompactionPolicy, MobCompactPartitionPolicy,
};
use crate::schema::bag::{
    coerce_bool, coerce_i32, coerce_i64, coerce_string, coerce_string_map,
};
use crate::schema::{keys, PropertyBag};
use crate::{Error, Result};

/// One validated family attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FamilySetting {
    BlockCache(bool),
    ReplicationScope(i32),
    CacheDataOnWrite(bool),
    CacheIndexOnWrite(bool),
    CacheBloomsOnWrite(bool),
    EvictBlocksOnClose(bool),
    InMemory(bool),
    InMemoryCompaction(MemoryCompactionPolicy),
    Ttl(i32),
    DataBlockEncoding(DataBlockEncoding),
    BlockSize(i32),
    Versions(i32),
    MinVersions(i32),
    KeepDeletedCells(KeepDeletedCells),
    CompressTags(bool),
    PrefetchBlocksOnOpen(bool),
    Mob(bool),
    MobThreshold(i64),
    MobCompactPartitionPolicy(MobCompactPartitionPolicy),
    NewVersionBehavior(bool),
    BloomFilter(BloomType),
    Compression(Compression),
    CompactionCompression(Compression),
    /// Algorithm plus the data key already wrapped under the master key
    Encryption {
        algorithm: String,
        wrapped_key: Option<Vec<u8>>,
    },
    StoragePolicy(String),
    DfsReplication(i16),
    /// `None` values remove the key
    Metadata(Vec<(String, Option<String>)>),
    Configuration(Vec<(String, Option<String>)>),
}

impl FamilySetting {
    fn apply(&self, cf: &mut ColumnFamilyDescriptor) {
        match self {
            FamilySetting::BlockCache(v) => cf.block_cache_enabled = *v,
            FamilySetting::ReplicationScope(v) => cf.replication_scope = *v,
            FamilySetting::CacheDataOnWrite(v) => cf.cache_data_on_write = *v,
            FamilySetting::CacheIndexOnWrite(v) => cf.cache_index_on_write = *v,
            FamilySetting::CacheBloomsOnWrite(v) => cf.cache_blooms_on_write = *v,
            FamilySetting::EvictBlocksOnClose(v) => cf.evict_blocks_on_close = *v,
            FamilySetting::InMemory(v) => cf.in_memory = *v,
            FamilySetting::InMemoryCompaction(v) => cf.in_memory_compaction = Some(*v),
            FamilySetting::Ttl(v) => cf.ttl = *v,
            FamilySetting::DataBlockEncoding(v) => cf.data_block_encoding = *v,
            FamilySetting::BlockSize(v) => cf.block_size = *v,
            FamilySetting::Versions(v) => cf.max_versions = *v,
            FamilySetting::MinVersions(v) => cf.min_versions = *v,
            FamilySetting::KeepDeletedCells(v) => cf.keep_deleted_cells = *v,
            FamilySetting::CompressTags(v) => cf.compress_tags = *v,
            FamilySetting::PrefetchBlocksOnOpen(v) => cf.prefetch_blocks_on_open = *v,
            FamilySetting::Mob(v) => cf.mob_enabled = *v,
            FamilySetting::MobThreshold(v) => cf.mob_threshold = *v,
            FamilySetting::MobCompactPartitionPolicy(v) => cf.mob_compact_partition_policy = *v,
            FamilySetting::NewVersionBehavior(v) => cf.new_version_behavior = *v,
            FamilySetting::BloomFilter(v) => cf.bloom_filter = *v,
            FamilySetting::Compression(v) => cf.compression = *v,
            FamilySetting::CompactionCompression(v) => cf.compaction_compression = Some(*v),
            FamilySetting::Encryption {
                algorithm,
                wrapped_key,
            } => {
                cf.encryption = Some(algorithm.clone());
                if let Some(key) = wrapped_key {
                    cf.encryption_key = Some(key.clone());
                }
            }
            FamilySetting::StoragePolicy(v) => cf.storage_policy = Some(v.clone()),
            FamilySetting::DfsReplication(v) => cf.dfs_replication = *v,
            FamilySetting::Metadata(pairs) => apply_pairs(&mut cf.metadata, pairs),
            FamilySetting::Configuration(pairs) => apply_pairs(&mut cf.configuration, pairs),
        }
    }
}

fn apply_pairs(
    map: &mut std::collections::BTreeMap<String, String>,
    pairs: &[(String, Option<String>)],
) {
    for (k, v) in pairs {
        match v {
            Some(v) => {
                map.insert(k.clone(), v.clone());
            }
            None => {
                map.remove(k);
            }
        }
    }
}

/// Validated edits to a single column family.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyChanges {
    pub name: String,
    pub settings: Vec<FamilySetting>,
}

impl FamilyChanges {
    /// A bare family name: defaults only.
    pub fn from_name(name: &str) -> Result<Self> {
        validate_family_name(name)?;
        Ok(Self {
            name: name.to_string(),
            settings: Vec::new(),
        })
    }

    /// Validate a family bag. Every value is coerced before anything is
    /// returned; unknown keys become warnings.
    pub fn parse(bag: &PropertyBag, ctx: &CompileContext) -> Result<(Self, Vec<SchemaWarning>)> {
        let name = match bag.get(keys::NAME) {
            Some(v) => coerce_string(keys::NAME, v)?,
            None => return Err(Error::MissingRequiredField(keys::NAME.to_string())),
        };
        validate_family_name(&name)?;

        let mut settings = Vec::new();
        let get = |key: &str| bag.get(key);

        if let Some(v) = get(keys::BLOCKCACHE) {
            settings.push(FamilySetting::BlockCache(coerce_bool(keys::BLOCKCACHE, v)?));
        }
        if let Some(v) = get(keys::REPLICATION_SCOPE) {
            settings.push(FamilySetting::ReplicationScope(coerce_i32(keys::REPLICATION_SCOPE, v)?));
        }
        if let Some(v) = get(keys::CACHE_DATA_ON_WRITE) {
            settings.push(FamilySetting::CacheDataOnWrite(coerce_bool(keys::CACHE_DATA_ON_WRITE, v)?));
        }
        if let Some(v) = get(keys::CACHE_INDEX_ON_WRITE) {
            settings.push(FamilySetting::CacheIndexOnWrite(coerce_bool(keys::CACHE_INDEX_ON_WRITE, v)?));
        }
        if let Some(v) = get(keys::CACHE_BLOOMS_ON_WRITE) {
            settings.push(FamilySetting::CacheBloomsOnWrite(coerce_bool(keys::CACHE_BLOOMS_ON_WRITE, v)?));
        }
        if let Some(v) = get(keys::EVICT_BLOCKS_ON_CLOSE) {
            settings.push(FamilySetting::EvictBlocksOnClose(coerce_bool(keys::EVICT_BLOCKS_ON_CLOSE, v)?));
        }
        if let Some(v) = get(keys::IN_MEMORY) {
            settings.push(FamilySetting::InMemory(coerce_bool(keys::IN_MEMORY, v)?));
        }
        if let Some(v) = get(keys::IN_MEMORY_COMPACTION) {
            settings.push(FamilySetting::InMemoryCompaction(coerce_enum(keys::IN_MEMORY_COMPACTION, v)?));
        }
        if let Some(v) = get(keys::TTL) {
            settings.push(FamilySetting::Ttl(coerce_ttl(keys::TTL, v)?));
        }
        if let Some(v) = get(keys::DATA_BLOCK_ENCODING) {
            settings.push(FamilySetting::DataBlockEncoding(coerce_enum(keys::DATA_BLOCK_ENCODING, v)?));
        }
        if let Some(v) = get(keys::BLOCKSIZE) {
            settings.push(FamilySetting::BlockSize(coerce_i32(keys::BLOCKSIZE, v)?));
        }
        if let Some(v) = get(keys::VERSIONS) {
            settings.push(FamilySetting::Versions(coerce_i32(keys::VERSIONS, v)?));
        }
        if let Some(v) = get(keys::MIN_VERSIONS) {
            settings.push(FamilySetting::MinVersions(coerce_i32(keys::MIN_VERSIONS, v)?));
        }
        if let Some(v) = get(keys::KEEP_DELETED_CELLS) {
            settings.push(FamilySetting::KeepDeletedCells(coerce_keep_deleted(keys::KEEP_DELETED_CELLS, v)?));
        }
        if let Some(v) = get(keys::COMPRESS_TAGS) {
            settings.push(FamilySetting::CompressTags(coerce_bool(keys::COMPRESS_TAGS, v)?));
        }
        if let Some(v) = get(keys::PREFETCH_BLOCKS_ON_OPEN) {
            settings.push(FamilySetting::PrefetchBlocksOnOpen(coerce_bool(keys::PREFETCH_BLOCKS_ON_OPEN, v)?));
        }
        if let Some(v) = get(keys::IS_MOB) {
            settings.push(FamilySetting::Mob(coerce_bool(keys::IS_MOB, v)?));
        }
        if let Some(v) = get(keys::MOB_THRESHOLD) {
            settings.push(FamilySetting::MobThreshold(coerce_i64(keys::MOB_THRESHOLD, v)?));
        }
        if let Some(v) = get(keys::MOB_COMPACT_PARTITION_POLICY) {
            settings.push(FamilySetting::MobCompactPartitionPolicy(coerce_enum(
                keys::MOB_COMPACT_PARTITION_POLICY,
                v,
            )?));
        }
        if let Some(v) = get(keys::NEW_VERSION_BEHAVIOR) {
            settings.push(FamilySetting::NewVersionBehavior(coerce_bool(keys::NEW_VERSION_BEHAVIOR, v)?));
        }
        if let Some(v) = get(keys::BLOOMFILTER) {
            settings.push(FamilySetting::BloomFilter(coerce_enum(keys::BLOOMFILTER, v)?));
        }
        if let Some(v) = get(keys::COMPRESSION) {
            settings.push(FamilySetting::Compression(coerce_enum(keys::COMPRESSION, v)?));
        }
        if let Some(v) = get(keys::COMPRESSION_COMPACT) {
            settings.push(FamilySetting::CompactionCompression(coerce_enum(keys::COMPRESSION_COMPACT, v)?));
        }
        if let Some(setting) = parse_encryption(bag, ctx)? {
            settings.push(setting);
        }
        if let Some(v) = get(keys::STORAGE_POLICY) {
            let policy = coerce_string(keys::STORAGE_POLICY, v)?.to_ascii_uppercase();
            settings.push(FamilySetting::StoragePolicy(policy));
        }
        if let Some(v) = get(keys::DFS_REPLICATION) {
            let replication = coerce_i32(keys::DFS_REPLICATION, v)?;
            let replication = i16::try_from(replication)
                .map_err(|_| Error::invalid_type(keys::DFS_REPLICATION, "16-bit integer", v))?;
            settings.push(FamilySetting::DfsReplication(replication));
        }
        if let Some(v) = get(keys::METADATA) {
            settings.push(FamilySetting::Metadata(coerce_string_map(keys::METADATA, v)?));
        }
        if let Some(v) = get(keys::CONFIGURATION) {
            settings.push(FamilySetting::Configuration(coerce_string_map(keys::CONFIGURATION, v)?));
        }

        let warnings = bag
            .unrecognized(|k| keys::FAMILY_KEYS.contains(&k))
            .into_iter()
            .map(|key| SchemaWarning::UnknownFamilyKey {
                family: name.clone(),
                key,
            })
            .collect();

        Ok((Self { name, settings }, warnings))
    }

    /// Merge into an existing family.
    pub fn apply_to(&self, cf: &mut ColumnFamilyDescriptor) {
        for setting in &self.settings {
            setting.apply(cf);
        }
    }

    /// A fresh family: defaults plus these changes.
    pub fn build(&self) -> ColumnFamilyDescriptor {
        let mut cf = ColumnFamilyDescriptor::new(self.name.clone());
        self.apply_to(&mut cf);
        cf
    }
}

fn parse_encryption(bag: &PropertyBag, ctx: &CompileContext) -> Result<Option<FamilySetting>> {
    let algorithm = match bag.get(keys::ENCRYPTION) {
        Some(v) => coerce_string(keys::ENCRYPTION, v)?.to_ascii_uppercase(),
        None => {
            if bag.contains_key(keys::ENCRYPTION_KEY) {
                return Err(Error::MissingRequiredField(format!(
                    "{} (required by {})",
                    keys::ENCRYPTION,
                    keys::ENCRYPTION_KEY
                )));
            }
            return Ok(None);
        }
    };

    let wrapped_key = match bag.get(keys::ENCRYPTION_KEY) {
        Some(v) => {
            let passphrase = coerce_string(keys::ENCRYPTION_KEY, v)?;
            let wrapper = ctx.key_wrapper().ok_or_else(|| {
                Error::Crypto("No master key configured; cannot wrap ENCRYPTION_KEY".to_string())
            })?;
            Some(wrapper.wrap_passphrase(&algorithm, &passphrase)?)
        }
        None => None,
    };

    Ok(Some(FamilySetting::Encryption {
        algorithm,
        wrapped_key,
    }))
}
