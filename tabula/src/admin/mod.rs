//! The cluster admin seam and the schema shell built on top of it.
//!
//! [`ClusterAdmin`] is whatever actually owns table and namespace
//! descriptors. Two implementations ship with the crate: [`MemoryCatalog`]
//! for tests and dry runs, and [`FileCatalog`] which keeps YAML documents
//! on disk.

mod file;
mod memory;

pub use file::{FileCatalog, TableRecord};
pub use memory::MemoryCatalog;

use crate::compiler::{
    compile_alter, compile_alter_namespace, compile_create, compile_create_namespace, AlterPlan,
    CompileContext, CreateTablePlan,
};
use crate::descriptor::{ColumnFamilyDescriptor, NamespaceDescriptor, TableDescriptor, TableName};
use crate::metrics;
use crate::schema::Arg;
use crate::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, instrument};

/// Operations the compiler needs from the cluster. Failures are returned
/// as-is to the caller.
#[async_trait]
pub trait ClusterAdmin: Send + Sync {
    /// Create a table pre-split at `splits`. Fails with `TableExists` or
    /// `NamespaceNotFound`.
    async fn create_table(&self, desc: &TableDescriptor, splits: &[Vec<u8>]) -> Result<()>;

    /// Fails with `TableNotFound`.
    async fn table_descriptor(&self, name: &TableName) -> Result<TableDescriptor>;

    async fn table_exists(&self, name: &TableName) -> Result<bool>;

    /// Replace the descriptor of an existing table.
    async fn modify_table(&self, name: &TableName, desc: &TableDescriptor) -> Result<()>;

    async fn list_tables(&self) -> Result<Vec<TableName>>;

    /// Fails with `NamespaceExists`.
    async fn create_namespace(&self, ns: &NamespaceDescriptor) -> Result<()>;

    /// Fails with `NamespaceNotFound`.
    async fn namespace_descriptor(&self, name: &str) -> Result<NamespaceDescriptor>;

    async fn modify_namespace(&self, ns: &NamespaceDescriptor) -> Result<()>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Operator-facing facade: compile property bags, then submit the result
/// to the admin service.
#[derive(Clone)]
pub struct SchemaShell {
    admin: Arc<dyn ClusterAdmin>,
    ctx: Arc<CompileContext>,
}

impl SchemaShell {
    pub fn new(admin: Arc<dyn ClusterAdmin>, ctx: Arc<CompileContext>) -> Self {
        Self { admin, ctx }
    }

    pub fn context(&self) -> &CompileContext {
        &self.ctx
    }

    /// Compile a create call without submitting it.
    pub fn plan_create(&self, table: &str, args: &[Arg]) -> Result<CreateTablePlan> {
        compile_create(table, args, &self.ctx)
    }

    #[instrument(skip(self, args))]
    pub async fn create_table(&self, table: &str, args: &[Arg]) -> Result<CreateTablePlan> {
        let plan = self.plan_create(table, args)?;
        let result = self.admin.create_table(&plan.descriptor, &plan.splits).await;
        metrics::record_admin_request("create_table", &result);
        result?;
        info!(
            table = %plan.descriptor.name,
            families = plan.descriptor.families().len(),
            regions = plan.splits.len() + 1,
            "Created table"
        );
        Ok(plan)
    }

    /// Compile an alter call against the live descriptor without submitting
    /// it.
    pub async fn plan_alter(&self, table: &str, args: &[Arg]) -> Result<AlterPlan> {
        let current = self.describe(table).await?;
        compile_alter(&current, args, &self.ctx)
    }

    /// Alter a table. The modify request is only sent when some intent
    /// changed the descriptor.
    #[instrument(skip(self, args))]
    pub async fn alter_table(&self, table: &str, args: &[Arg]) -> Result<AlterPlan> {
        let plan = self.plan_alter(table, args).await?;
        if !plan.dirty {
            info!(table = %plan.descriptor.name, "Nothing to alter");
            return Ok(plan);
        }
        let result = self
            .admin
            .modify_table(&plan.descriptor.name, &plan.descriptor)
            .await;
        metrics::record_admin_request("modify_table", &result);
        result?;
        info!(
            table = %plan.descriptor.name,
            intents = plan.intents.len(),
            "Altered table"
        );
        Ok(plan)
    }

    #[instrument(skip(self, args))]
    pub async fn create_namespace(&self, name: &str, args: &[Arg]) -> Result<NamespaceDescriptor> {
        let ns = compile_create_namespace(name, args)?;
        let result = self.admin.create_namespace(&ns).await;
        metrics::record_admin_request("create_namespace", &result);
        result?;
        info!(namespace = %ns.name, "Created namespace");
        Ok(ns)
    }

    #[instrument(skip(self, args))]
    pub async fn alter_namespace(&self, name: &str, args: &[Arg]) -> Result<NamespaceDescriptor> {
        let current = self.describe_namespace(name).await?;
        let (ns, changes) = compile_alter_namespace(&current, args)?;
        let result = self.admin.modify_namespace(&ns).await;
        metrics::record_admin_request("modify_namespace", &result);
        result?;
        info!(namespace = %ns.name, changes = changes.len(), "Altered namespace");
        Ok(ns)
    }

    pub async fn describe(&self, table: &str) -> Result<TableDescriptor> {
        let name = TableName::parse(table)?;
        let result = self.admin.table_descriptor(&name).await;
        metrics::record_admin_request("table_descriptor", &result);
        result
    }

    pub async fn exists(&self, table: &str) -> Result<bool> {
        let name = TableName::parse(table)?;
        self.admin.table_exists(&name).await
    }

    /// Table names, optionally filtered by a regex over the rendered name.
    pub async fn list_tables(&self, pattern: Option<&str>) -> Result<Vec<TableName>> {
        let filter = pattern
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p))
                    .map_err(|e| Error::InvalidArgument(format!("Invalid table pattern: {}", e)))
            })
            .transpose()?;
        let result = self.admin.list_tables().await;
        metrics::record_admin_request("list_tables", &result);
        let mut tables = result?;
        if let Some(re) = filter {
            tables.retain(|t| re.is_match(&t.to_string()));
        }
        tables.sort();
        Ok(tables)
    }

    pub async fn get_column_families(&self, table: &str) -> Result<Vec<ColumnFamilyDescriptor>> {
        Ok(self.describe(table).await?.families().to_vec())
    }

    pub async fn get_table_attributes(&self, table: &str) -> Result<String> {
        Ok(self.describe(table).await?.attributes_summary())
    }

    pub async fn describe_namespace(&self, name: &str) -> Result<NamespaceDescriptor> {
        let result = self.admin.namespace_descriptor(name).await;
        metrics::record_admin_request("namespace_descriptor", &result);
        result
    }
}
