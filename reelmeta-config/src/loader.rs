use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use tracing::{debug, warn};

use crate::models::{Config, ConfigLoad, ConfigSource};
use crate::util::{non_empty_var, parse_bool};

pub const CONFIG_PATH_VAR: &str = "REELMETA_CONFIG_PATH";
pub const CONFIG_INLINE_VAR: &str = "REELMETA_CONFIG";
pub const API_KEY_VAR: &str = "TMDB_API_KEY";
pub const LANGUAGE_VAR: &str = "TMDB_LANG";
pub const STRICT_VAR: &str = "REELMETA_STRICT";

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["reelmeta.toml", "config/reelmeta.toml", "reelmeta.json"];

/// Environment values the loader reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub config_inline: Option<String>,
    pub api_key: Option<String>,
    pub language: Option<String>,
    /// Raw `REELMETA_STRICT` value.
    pub strict: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var(CONFIG_PATH_VAR).map(PathBuf::from),
            config_inline: non_empty_var(CONFIG_INLINE_VAR),
            api_key: non_empty_var(API_KEY_VAR),
            language: non_empty_var(LANGUAGE_VAR),
            strict: non_empty_var(STRICT_VAR),
        }
    }
}

/// Layered loader: `.env`, then one config source, then environment
/// overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    env: Option<EnvConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads this file instead of consulting the environment for a source.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Uses `env` instead of the process environment and skips `.env`.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        let (env, env_file_loaded) = match &self.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (mut config, source) = self.select_source(&env)?;
        config.apply_env(&env);
        debug!(?source, env_file_loaded, "loaded configuration");

        Ok(ConfigLoad {
            config,
            source,
            env_file_loaded,
        })
    }

    fn load_env_file(&self) -> anyhow::Result<bool> {
        let result = match &self.env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err).context("failed to parse .env file"),
        }
    }

    fn select_source(
        &self,
        env: &EnvConfig,
    ) -> anyhow::Result<(Config, ConfigSource)> {
        if let Some(path) = &self.config_path {
            let config = Config::load_from_file(path)?;
            return Ok((config, ConfigSource::File(path.clone())));
        }

        if let Some(path) = &env.config_path {
            let config = Config::load_from_file(path)?;
            return Ok((config, ConfigSource::EnvPath(path.clone())));
        }

        if let Some(raw) = &env.config_inline {
            let config = Config::parse_from_str(raw, CONFIG_INLINE_VAR)
                .with_context(|| format!("failed to parse {CONFIG_INLINE_VAR}"))?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = Config::find_default_file() {
            let config = Config::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Config::default(), ConfigSource::Default))
    }
}

impl Config {
    /// Loads configuration from the process environment.
    /// Evaluation order:
    /// 1) `.env` in the working directory, if present,
    /// 2) `$REELMETA_CONFIG_PATH` (TOML or JSON file),
    /// 3) `$REELMETA_CONFIG` (inline TOML or JSON),
    /// 4) the first of `reelmeta.toml`, `config/reelmeta.toml`, `reelmeta.json`,
    /// 5) defaults;
    ///
    /// then `TMDB_API_KEY`, `TMDB_LANG` and `REELMETA_STRICT` override the
    /// result.
    pub fn load() -> anyhow::Result<ConfigLoad> {
        ConfigLoader::new().load()
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("invalid config {}", path.display())),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!("invalid config {}: {}", path.display(), err)
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    fn find_default_file() -> Option<PathBuf> {
        DEFAULT_CONFIG_LOCATIONS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(key) = &env.api_key {
            self.provider.api_key = Some(key.clone());
        }
        if let Some(language) = &env.language {
            self.provider.language = language.clone();
        }
        if let Some(raw) = &env.strict {
            match parse_bool(raw) {
                Some(strict) => self.matching.strict = strict,
                None => warn!(value = %raw, "ignoring unrecognised {STRICT_VAR}"),
            }
        }
    }
}
