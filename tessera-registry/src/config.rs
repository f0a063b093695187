//! Registry configuration, optionally read from a `tessera.toml`.
//!
//! ```toml
//! [migrations]
//! strict = false        # fail decode when a migration chain stops short
//!
//! [i18n]
//! on_error = "propagate" # or "skip": drop the failing language and warn
//!
//! [ids]
//! strategy = "v4"        # or "v7" for time-ordered ids
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_types::IdStrategy;
use tracing::{info, warn};

/// What to do when one language's state fails to transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum I18nErrorPolicy {
    /// Fail the whole decode/encode.
    #[default]
    Propagate,
    /// Drop that language's entry and log a warning.
    Skip,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Error out when migrations end on a version other than the plugin's.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nConfig {
    #[serde(default)]
    pub on_error: I18nErrorPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default)]
    pub strategy: IdStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub migrations: MigrationConfig,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub ids: IdConfig,
}

impl RegistryConfig {
    /// Parses a config document, rejecting malformed input.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads a config file, rejecting a missing or malformed file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads config from `path` if it exists.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No registry config found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded registry config from {:?}", path);
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load registry config {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }
}
