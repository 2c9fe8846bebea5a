//! Defaults applied before any file or environment source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("search.min_query_len", 2_i64)?
        .set_default("search.per_level_limit", 5_i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")
}
