//! Configuration
//!
//! Layered configuration for the navigation engine: built-in defaults, the
//! global config file, an optional explicit file, then `INFRANAV__*`
//! environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ApiError;
use crate::level::Level;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NavConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.search.min_query_len == 0 {
            return Err(ApiError::ConfigError(
                "search.min_query_len must be at least 1".to_string(),
            ));
        }
        if self.search.per_level_limit == 0 {
            return Err(ApiError::ConfigError(
                "search.per_level_limit must be at least 1".to_string(),
            ));
        }
        for level in Level::ALL {
            if self.backend.tables.for_level(level).trim().is_empty() {
                return Err(ApiError::ConfigError(format!(
                    "backend.tables.{} cannot be empty",
                    level
                )));
            }
        }
        Ok(())
    }
}

/// REST backend connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `https://example.supabase.co`
    #[serde(default)]
    pub url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Schema sent as `Accept-Profile`
    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default)]
    pub tables: TableNames,
}

/// Per-level table names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_sites")]
    pub site: String,
    #[serde(default = "default_datacenters")]
    pub datacenter: String,
    #[serde(default = "default_clusters")]
    pub cluster: String,
    #[serde(default = "default_nodes")]
    pub node: String,
    #[serde(default = "default_domains")]
    pub domain: String,
    #[serde(default = "default_vms")]
    pub vm: String,
}

fn default_sites() -> String {
    Level::Site.default_table().to_string()
}

fn default_datacenters() -> String {
    Level::Datacenter.default_table().to_string()
}

fn default_clusters() -> String {
    Level::Cluster.default_table().to_string()
}

fn default_nodes() -> String {
    Level::Node.default_table().to_string()
}

fn default_domains() -> String {
    Level::Domain.default_table().to_string()
}

fn default_vms() -> String {
    Level::Vm.default_table().to_string()
}

impl TableNames {
    pub fn for_level(&self, level: Level) -> &str {
        match level {
            Level::Site => &self.site,
            Level::Datacenter => &self.datacenter,
            Level::Cluster => &self.cluster,
            Level::Node => &self.node,
            Level::Domain => &self.domain,
            Level::Vm => &self.vm,
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            site: default_sites(),
            datacenter: default_datacenters(),
            cluster: default_clusters(),
            node: default_nodes(),
            domain: default_domains(),
            vm: default_vms(),
        }
    }
}

/// Cross-level search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) issue no reads
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Result cap applied to each level independently
    #[serde(default = "default_per_level_limit")]
    pub per_level_limit: usize,
}

fn default_min_query_len() -> usize {
    2
}

fn default_per_level_limit() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            per_level_limit: default_per_level_limit(),
        }
    }
}

/// Durable navigation state settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory of the state database; None means `$XDG_DATA_HOME/infranav/state`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StateConfig {
    pub fn resolve_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => Ok(xdg::state_dir()?),
        }
    }
}
