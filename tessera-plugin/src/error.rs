//! Error types for plugin descriptors.

use thiserror::Error;

/// A descriptor or migration step failed validation.
///
/// Raised when the descriptor is built, so a bad plugin is rejected at
/// registration time and never during resolution.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("plugin name is required")]
    MissingName,

    #[error("plugin '{name}' has invalid version '{version}': {source}")]
    InvalidVersion {
        name: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("plugin '{0}' has no render hook")]
    MissingRender(String),

    #[error("migration target '{version}' is not a valid version: {source}")]
    InvalidMigrationTarget {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("migration source range '{range}' is not a valid range: {source}")]
    InvalidMigrationRange {
        range: String,
        #[source]
        source: semver::Error,
    },
}

/// A plugin's encode or decode hook rejected a state value.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StateError {
    message: String,
}

impl StateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}
