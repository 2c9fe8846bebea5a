//! Environment variable source: INFRANAV_ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `INFRANAV__SEARCH__PER_LEVEL_LIMIT=10` sets `search.per_level_limit`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("INFRANAV")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
