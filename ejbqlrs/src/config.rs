//! Configuration for the translator.
//!
//! Supports TOML-based configuration with translation defaults and a dialect
//! selection.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, GenericDialect, PostgresDialect};
use crate::error::{Result, TranslationError};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub translation: TranslationConfig,
    pub dialect: DialectConfig,
}

/// Per-translation defaults copied into every translation context.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Qualify columns with short table aliases (default: true).
    pub use_table_aliases: bool,
    /// The database collation is case-insensitive, so ignore-case LIKE
    /// does not need UPPER() wrapping (default: false).
    pub case_insensitive: bool,
    /// Wrap select-list columns in `#result(...)` directives (default: true).
    pub annotate_result_columns: bool,
    /// SQL type used for null parameters whose type can't be inferred.
    pub default_parameter_type: String,
    /// Prefix of generated parameter names (default: "id").
    pub parameter_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialectName {
    #[default]
    Generic,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectConfig {
    pub name: DialectName,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            use_table_aliases: true,
            case_insensitive: false,
            annotate_result_columns: true,
            default_parameter_type: "VARCHAR".to_string(),
            parameter_prefix: "id".to_string(),
        }
    }
}

impl DialectConfig {
    pub fn build(&self) -> Box<dyn Dialect> {
        match self.name {
            DialectName::Generic => Box::new(GenericDialect),
            DialectName::Postgres => Box::new(PostgresDialect),
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TranslationError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| TranslationError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `EJBQL_CONFIG` environment variable
    /// 2. `./ejbql.toml` (current directory)
    /// 3. `~/.config/ejbql/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("EJBQL_CONFIG") {
            if let Ok(cfg) = Self::from_file(&path) {
                tracing::info!(path = %path, "loaded config from EJBQL_CONFIG");
                return cfg;
            }
        }

        if let Ok(cfg) = Self::from_file("ejbql.toml") {
            tracing::info!("loaded config from ./ejbql.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ejbql").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }
}
