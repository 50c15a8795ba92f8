//! Configuration (`taskgate.toml`)
//!
//! ```toml
//! tenants = ["acme", "beta"]
//!
//! [processes]
//! base_path = "processes"
//! shared_group = "all"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no tenant list configured")]
    Missing,

    #[error("tenant list is empty")]
    NoTenants,

    #[error("tenant #{0} has a blank id")]
    BlankTenant(usize),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskgateConfig {
    /// Absent disables the multi-tenant import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenants: Option<Vec<String>>,
    #[serde(default)]
    pub processes: ProcessesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where process artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessesConfig {
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    /// Folder (under `base_path`) deployed to every tenant.
    #[serde(default = "default_shared_group")]
    pub shared_group: String,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("processes")
}

fn default_shared_group() -> String {
    "all".to_string()
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            shared_group: default_shared_group(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl TaskgateConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_tenants<I, S>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tenants = Some(tenants.into_iter().map(Into::into).collect());
        self
    }
}
