//! Configuration management module.
//!
//! Supports loading storage groups from:
//! - TOML files (config/default.toml, config/{profile}.toml)
//! - Environment variables with `STORAGE_GROUPS__<SECTION>__<KEY>` pattern
//!
//! ```toml
//! [groups.default.cache]
//! backend = "memory"
//!
//! [groups.images.store]
//! backend = "file"
//! directory = "uploads"
//! prefix = "img"
//! ```

mod storage;

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub use storage::{BackendKind, BackendSpec, GroupSpec, validate_groups};

/// Storage group settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Group name -> role name -> backend declaration.
    #[serde(default)]
    pub groups: HashMap<String, GroupSpec>,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Load settings from files and environment.
    ///
    /// Settings are loaded in the following order (later sources override earlier):
    /// 1. `.env` (if present, only populates the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{STORAGE_GROUPS_PROFILE}.toml` (if `STORAGE_GROUPS_PROFILE` is set)
    /// 4. Environment variables with `STORAGE_GROUPS__` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let profile =
            std::env::var("STORAGE_GROUPS_PROFILE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            // STORAGE_GROUPS__GROUPS__IMAGES__CACHE__BACKEND=memory
            .add_source(
                Environment::with_prefix("STORAGE_GROUPS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Parse settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or invalid.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any group declaration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_groups(&self.groups)?;

        if !matches!(self.observability.log_format.as_str(), "text" | "json") {
            return Err(ConfigError::Message(format!(
                "observability.log_format must be \"text\" or \"json\", got {:?}",
                self.observability.log_format
            )));
        }

        Ok(())
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}
