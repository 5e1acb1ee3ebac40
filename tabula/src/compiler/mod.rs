//! Declarative schema-mutation compiler.
//!
//! Property bags are classified and validated up front into typed change
//! sets; only then are they applied, to a copy of the descriptor. A batch
//! either yields a complete plan or an error with nothing applied.

pub mod alter;
pub mod coerce;
pub mod create;
pub mod family;
pub mod namespace;
pub mod partition;
pub mod split;
pub mod table;

pub use alter::{classify, compile_alter, AlterPlan, MutationIntent};
pub use create::{compile_create, CreateTablePlan};
pub use family::{FamilyChanges, FamilySetting};
pub use namespace::{compile_alter_namespace, compile_create_namespace, NamespaceChange};
pub use partition::{
    check_region_count, DecimalStringSplit, HexStringSplit, PartitionerRegistry, SplitAlgorithm,
    UniformSplit, MAX_REGIONS,
};
pub use split::SplitSpec;
pub use table::TableChanges;

use crate::crypto::KeyWrapper;
use crate::metrics;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Read-only inputs shared by every compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    key_wrapper: Option<Arc<KeyWrapper>>,
    partitioners: PartitionerRegistry,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_wrapper(mut self, wrapper: KeyWrapper) -> Self {
        self.key_wrapper = Some(Arc::new(wrapper));
        self
    }

    pub fn key_wrapper(&self) -> Option<&KeyWrapper> {
        self.key_wrapper.as_deref()
    }

    /// Make an additional partitioner available to `SPLITALGO`.
    pub fn register_partitioner(&mut self, algorithm: Arc<dyn SplitAlgorithm>) {
        self.partitioners.register(algorithm);
    }

    pub fn partitioners(&self) -> &PartitionerRegistry {
        &self.partitioners
    }
}

/// A non-fatal finding raised while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    UnknownFamilyKey { family: String, key: String },
    UnknownTableKey { key: String },
    FamilyReplaced { family: String },
    IgnoredMethodKey { method: String, key: String },
    MissingFamilyDelete { family: String },
}

impl SchemaWarning {
    /// Metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaWarning::UnknownFamilyKey { .. } => "unknown_family_key",
            SchemaWarning::UnknownTableKey { .. } => "unknown_table_key",
            SchemaWarning::FamilyReplaced { .. } => "family_replaced",
            SchemaWarning::IgnoredMethodKey { .. } => "ignored_method_key",
            SchemaWarning::MissingFamilyDelete { .. } => "missing_family_delete",
        }
    }

    /// Log the warning and count it.
    pub(crate) fn emit(&self) {
        warn!(kind = self.kind(), "{}", self);
        metrics::record_schema_warning(self.kind());
    }
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::UnknownFamilyKey { family, key } => {
                write!(f, "Unknown argument ignored for column family {}: {}", family, key)
            }
            SchemaWarning::UnknownTableKey { key } => {
                write!(f, "Unknown argument ignored: {}", key)
            }
            SchemaWarning::FamilyReplaced { family } => write!(
                f,
                "Column family {} defined more than once, keeping the last definition",
                family
            ),
            SchemaWarning::IgnoredMethodKey { method, key } => {
                write!(f, "Unknown argument ignored for method {}: {}", method, key)
            }
            SchemaWarning::MissingFamilyDelete { family } => {
                write!(f, "Column family {} does not exist, nothing to delete", family)
            }
        }
    }
}

/// Emit every warning of a finished compilation.
pub(crate) fn emit_all(warnings: &[SchemaWarning]) {
    for warning in warnings {
        warning.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = SchemaWarning::UnknownFamilyKey {
            family: "cf1".into(),
            key: "FOO".into(),
        };
        assert_eq!(w.kind(), "unknown_family_key");
        assert_eq!(
            w.to_string(),
            "Unknown argument ignored for column family cf1: FOO"
        );
    }

    #[test]
    fn test_context_without_master_key() {
        let ctx = CompileContext::new();
        assert!(ctx.key_wrapper().is_none());
        assert!(ctx.partitioners().get("HexStringSplit").is_some());
    }
}
