//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::NavConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment, then validate.
    pub fn load() -> Result<NavConfig, ApiError> {
        let config = MergeService::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, then validate.
    pub fn load_from_file(path: &Path) -> Result<NavConfig, ApiError> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> NavConfig {
        NavConfig::default()
    }
}
