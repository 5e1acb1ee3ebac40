use super::ClusterAdmin;
use crate::descriptor::{
    NamespaceDescriptor, TableDescriptor, TableName, DEFAULT_NAMESPACE, SYSTEM_NAMESPACE,
};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct TableEntry {
    descriptor: TableDescriptor,
    splits: Vec<Vec<u8>>,
}

/// In-process catalog. Starts with the `default` and `hbase` namespaces.
#[derive(Debug)]
pub struct MemoryCatalog {
    tables: RwLock<BTreeMap<TableName, TableEntry>>,
    namespaces: RwLock<BTreeMap<String, NamespaceDescriptor>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        let namespaces = [DEFAULT_NAMESPACE, SYSTEM_NAMESPACE]
            .into_iter()
            .map(|ns| {
                (
                    ns.to_string(),
                    NamespaceDescriptor {
                        name: ns.to_string(),
                        configuration: BTreeMap::new(),
                    },
                )
            })
            .collect();
        Self {
            tables: RwLock::new(BTreeMap::new()),
            namespaces: RwLock::new(namespaces),
        }
    }

    /// Split keys the table was created with.
    pub fn splits(&self, name: &TableName) -> Option<Vec<Vec<u8>>> {
        self.tables.read().get(name).map(|e| e.splits.clone())
    }

    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }
}

#[async_trait]
impl ClusterAdmin for MemoryCatalog {
    async fn create_table(&self, desc: &TableDescriptor, splits: &[Vec<u8>]) -> Result<()> {
        if !self.namespaces.read().contains_key(desc.name.namespace()) {
            return Err(Error::NamespaceNotFound(desc.name.namespace().to_string()));
        }
        let mut tables = self.tables.write();
        if tables.contains_key(&desc.name) {
            return Err(Error::TableExists(desc.name.to_string()));
        }
        tables.insert(
            desc.name.clone(),
            TableEntry {
                descriptor: desc.clone(),
                splits: splits.to_vec(),
            },
        );
        Ok(())
    }

    async fn table_descriptor(&self, name: &TableName) -> Result<TableDescriptor> {
        self.tables
            .read()
            .get(name)
            .map(|e| e.descriptor.clone())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    async fn table_exists(&self, name: &TableName) -> Result<bool> {
        Ok(self.tables.read().contains_key(name))
    }

    async fn modify_table(&self, name: &TableName, desc: &TableDescriptor) -> Result<()> {
        let mut tables = self.tables.write();
        let entry = tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        entry.descriptor = desc.clone();
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<TableName>> {
        Ok(self.tables.read().keys().cloned().collect())
    }

    async fn create_namespace(&self, ns: &NamespaceDescriptor) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        if namespaces.contains_key(&ns.name) {
            return Err(Error::NamespaceExists(ns.name.clone()));
        }
        namespaces.insert(ns.name.clone(), ns.clone());
        Ok(())
    }

    async fn namespace_descriptor(&self, name: &str) -> Result<NamespaceDescriptor> {
        self.namespaces
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NamespaceNotFound(name.to_string()))
    }

    async fn modify_namespace(&self, ns: &NamespaceDescriptor) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        let slot = namespaces
            .get_mut(&ns.name)
            .ok_or_else(|| Error::NamespaceNotFound(ns.name.clone()))?;
        *slot = ns.clone();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ColumnFamilyDescriptor;

    fn table(name: &str) -> TableDescriptor {
        let mut t = TableDescriptor::new(TableName::parse(name).unwrap());
        t.upsert_family(ColumnFamilyDescriptor::new("f"));
        t
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let catalog = MemoryCatalog::new();
        let t = table("t1");
        catalog.create_table(&t, &[b"m".to_vec()]).await.unwrap();
        assert_eq!(catalog.table_descriptor(&t.name).await.unwrap(), t);
        assert_eq!(catalog.splits(&t.name).unwrap(), vec![b"m".to_vec()]);
        assert!(matches!(
            catalog.create_table(&t, &[]).await,
            Err(Error::TableExists(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_namespace() {
        let catalog = MemoryCatalog::new();
        assert!(matches!(
            catalog.create_table(&table("nope:t1"), &[]).await,
            Err(Error::NamespaceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_modify_missing_table() {
        let catalog = MemoryCatalog::new();
        let t = table("t1");
        assert!(matches!(
            catalog.modify_table(&t.name, &t).await,
            Err(Error::TableNotFound(_))
        ));
    }
}
