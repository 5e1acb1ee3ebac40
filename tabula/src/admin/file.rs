//! YAML catalog on the local filesystem.
//!
//! ```text
//! <root>/namespaces/<namespace>.yaml
//! <root>/tables/<namespace>/<qualifier>.yaml
//! ```

use super::ClusterAdmin;
use crate::descriptor::{
    validate_namespace, NamespaceDescriptor, TableDescriptor, TableName, DEFAULT_NAMESPACE,
    SYSTEM_NAMESPACE,
};
use crate::schema::{to_bytes_binary, to_string_binary};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// A table as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    pub descriptor: TableDescriptor,
    /// Split keys in printable binary form
    #[serde(default)]
    pub splits: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableRecord {
    pub fn split_keys(&self) -> Vec<Vec<u8>> {
        self.splits.iter().map(|s| to_bytes_binary(s)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NamespaceRecord {
    descriptor: NamespaceDescriptor,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub struct FileCatalog {
    root: PathBuf,
    /// Serializes check-then-write sequences
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for FileCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCatalog").field("root", &self.root).finish()
    }
}

impl FileCatalog {
    /// Open (or initialize) a catalog rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("namespaces")).await?;
        fs::create_dir_all(root.join("tables")).await?;

        let catalog = Self {
            root,
            write_lock: Mutex::new(()),
        };
        for ns in [DEFAULT_NAMESPACE, SYSTEM_NAMESPACE] {
            if !catalog.namespace_path(ns).exists() {
                let now = Utc::now();
                let record = NamespaceRecord {
                    descriptor: NamespaceDescriptor::new(ns)?,
                    created_at: now,
                    updated_at: now,
                };
                catalog.write_yaml(&catalog.namespace_path(ns), &record).await?;
            }
        }
        debug!(root = %catalog.root.display(), "Opened file catalog");
        Ok(catalog)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_path(&self, name: &str) -> PathBuf {
        self.root.join("namespaces").join(format!("{}.yaml", name))
    }

    fn table_path(&self, name: &TableName) -> PathBuf {
        self.root
            .join("tables")
            .join(name.namespace())
            .join(format!("{}.yaml", name.qualifier()))
    }

    async fn write_yaml<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_yaml::to_string(value)?;
        fs::write(path, content).await?;
        Ok(())
    }

    async fn read_table(&self, name: &TableName) -> Result<TableRecord> {
        let path = self.table_path(name);
        if !path.exists() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_yaml::from_str(&content)?)
    }

    async fn read_namespace(&self, name: &str) -> Result<NamespaceRecord> {
        validate_namespace(name)?;
        let path = self.namespace_path(name);
        if !path.exists() {
            return Err(Error::NamespaceNotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Full stored record, including split keys and timestamps.
    pub async fn table_record(&self, name: &TableName) -> Result<TableRecord> {
        self.read_table(name).await
    }
}

#[async_trait]
impl ClusterAdmin for FileCatalog {
    async fn create_table(&self, desc: &TableDescriptor, splits: &[Vec<u8>]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !self.namespace_path(desc.name.namespace()).exists() {
            return Err(Error::NamespaceNotFound(desc.name.namespace().to_string()));
        }
        let path = self.table_path(&desc.name);
        if path.exists() {
            return Err(Error::TableExists(desc.name.to_string()));
        }
        let now = Utc::now();
        let record = TableRecord {
            descriptor: desc.clone(),
            splits: splits.iter().map(|k| to_string_binary(k)).collect(),
            created_at: now,
            updated_at: now,
        };
        self.write_yaml(&path, &record).await
    }

    async fn table_descriptor(&self, name: &TableName) -> Result<TableDescriptor> {
        Ok(self.read_table(name).await?.descriptor)
    }

    async fn table_exists(&self, name: &TableName) -> Result<bool> {
        Ok(self.table_path(name).exists())
    }

    async fn modify_table(&self, name: &TableName, desc: &TableDescriptor) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.read_table(name).await?;
        record.descriptor = desc.clone();
        record.updated_at = Utc::now();
        self.write_yaml(&self.table_path(name), &record).await
    }

    async fn list_tables(&self) -> Result<Vec<TableName>> {
        let mut tables = Vec::new();
        let mut namespaces = fs::read_dir(self.root.join("tables")).await?;
        while let Some(ns_entry) = namespaces.next_entry().await? {
            if !ns_entry.file_type().await?.is_dir() {
                continue;
            }
            let ns = ns_entry.file_name().to_string_lossy().to_string();
            let mut files = fs::read_dir(ns_entry.path()).await?;
            while let Some(entry) = files.next_entry().await? {
                let file_name = entry.file_name().to_string_lossy().to_string();
                if let Some(qualifier) = file_name.strip_suffix(".yaml") {
                    tables.push(TableName::parse(&format!("{}:{}", ns, qualifier))?);
                }
            }
        }
        tables.sort();
        Ok(tables)
    }

    async fn create_namespace(&self, ns: &NamespaceDescriptor) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.namespace_path(&ns.name);
        if path.exists() {
            return Err(Error::NamespaceExists(ns.name.clone()));
        }
        let now = Utc::now();
        let record = NamespaceRecord {
            descriptor: ns.clone(),
            created_at: now,
            updated_at: now,
        };
        self.write_yaml(&path, &record).await
    }

    async fn namespace_descriptor(&self, name: &str) -> Result<NamespaceDescriptor> {
        Ok(self.read_namespace(name).await?.descriptor)
    }

    async fn modify_namespace(&self, ns: &NamespaceDescriptor) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.read_namespace(&ns.name).await?;
        record.descriptor = ns.clone();
        record.updated_at = Utc::now();
        self.write_yaml(&self.namespace_path(&ns.name), &record).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
