pub mod admin;
pub mod compiler;
pub mod config;
pub mod crypto;
pub mod descriptor;
pub mod error;
pub mod metrics;
pub mod schema;

pub use admin::{ClusterAdmin, FileCatalog, MemoryCatalog, SchemaShell};
pub use compiler::{CompileContext, SchemaWarning};
pub use config::Config;
pub use error::{Error, Result};
pub use schema::{Arg, PropertyBag};
