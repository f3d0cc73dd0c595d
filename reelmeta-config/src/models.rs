use std::path::PathBuf;

use reelmeta_core::{
    CategoryConfig, MatcherConfig, MetaCacheConfig, TmdbConfig, WordRules,
};
use serde::{Deserialize, Serialize};

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    /// `$REELMETA_CONFIG_PATH`
    EnvPath(PathBuf),
    /// `$REELMETA_CONFIG`
    EnvInline,
    /// An explicit path or one of the default locations.
    File(PathBuf),
}

/// Complete reelmeta configuration. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Metadata provider. Without an API key lookups are disabled and only
    /// parsing runs.
    pub provider: TmdbConfig,
    pub matching: MatcherConfig,
    /// Metadata cache location, validity window and expiry policy.
    pub cache: MetaCacheConfig,
    /// Word rules applied to titles before parsing.
    pub parser: WordRules,
    pub categories: CategoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

/// Result of [`crate::ConfigLoader::load`].
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub source: ConfigSource,
    pub env_file_loaded: bool,
}
