//! Configuration management for tabula
//!
//! Default config location: ~/.tabula/config.toml

use crate::compiler::CompileContext;
use crate::crypto::KeyWrapper;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub encryption: EncryptionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Directory holding the file catalog
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tabula")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Master key used to wrap column family keys.
///
/// Prefer `master_key_env`; a key written into the file is readable by
/// anyone who can read the config.
#[derive(Clone, Deserialize, Serialize)]
pub struct EncryptionConfig {
    /// 64-character hex key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_key: Option<String>,
    /// Environment variable holding the hex key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_key_env: Option<String>,
    #[serde(default = "default_master_key_alias")]
    pub master_key_alias: String,
}

fn default_master_key_alias() -> String {
    "tabula".to_string()
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            master_key: None,
            master_key_env: None,
            master_key_alias: default_master_key_alias(),
        }
    }
}

impl std::fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("master_key_env", &self.master_key_env)
            .field("master_key_alias", &self.master_key_alias)
            .finish()
    }
}

impl EncryptionConfig {
    /// Build the key wrapper, if a master key is configured. An inline key
    /// wins over the environment variable.
    pub fn key_wrapper(&self) -> crate::Result<Option<KeyWrapper>> {
        if let Some(ref key) = self.master_key {
            return KeyWrapper::from_hex(key, &self.master_key_alias).map(Some);
        }
        if let Some(ref var) = self.master_key_env {
            return KeyWrapper::from_env(var, &self.master_key_alias).map(Some);
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log output format: "pretty" or "json"
    /// Override with LOG_FORMAT env var
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Install the Prometheus recorder in the CLI
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info,tabula=debug".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            metrics_enabled: true,
        }
    }
}

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        Ok(home.join(rest))
    } else if s == "~" {
        dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))
    } else {
        Ok(path.to_path_buf())
    }
}

impl Config {
    /// Default config file path (~/.tabula/config.toml)
    pub fn default_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Load config from file path, or create default
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.expand_paths()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            // Try to save default config
            if let Some(parent) = config_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = config.save(config_path);
            config.expand_paths()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Expand ~ in all paths
    fn expand_paths(&mut self) -> Result<()> {
        self.catalog.data_dir = expand_tilde(&self.catalog.data_dir)?;
        Ok(())
    }

    /// Compile context carrying the configured key wrapper.
    pub fn compile_context(&self) -> Result<CompileContext> {
        let ctx = CompileContext::new();
        match self.encryption.key_wrapper()? {
            Some(wrapper) => Ok(ctx.with_key_wrapper(wrapper)),
            None => Ok(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.catalog.data_dir.ends_with(".tabula"));
        assert_eq!(config.observability.log_format, "pretty");
        assert!(config.encryption.master_key.is_none());
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.encryption.master_key_alias, "tabula");
    }

    #[test]
    fn test_parse_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[catalog]
data_dir = "/var/lib/tabula"

[encryption]
master_key = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"

[observability]
log_format = "json"
"#,
        )
        .unwrap();
        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.catalog.data_dir, PathBuf::from("/var/lib/tabula"));
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.observability.log_level, "info,tabula=debug");
        let ctx = config.compile_context().unwrap();
        assert!(ctx.key_wrapper().is_some());
    }

    #[test]
    fn test_debug_redacts_master_key() {
        let config = EncryptionConfig {
            master_key: Some("deadbeef".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("deadbeef"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde(Path::new("~/x")).unwrap(), home.join("x"));
        assert_eq!(expand_tilde(Path::new("/abs")).unwrap(), PathBuf::from("/abs"));
    }
}
