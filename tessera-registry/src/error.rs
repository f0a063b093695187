//! Error types for the registry and tree codec.

use tessera_plugin::StateError;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("plugin '{plugin}' failed to {stage} state: {source}")]
    State {
        plugin: String,
        stage: &'static str,
        #[source]
        source: StateError,
    },

    #[error("'{lang}' state: {source}")]
    Localized {
        lang: String,
        #[source]
        source: Box<CodecError>,
    },

    #[error("state of plugin '{plugin}' migrated to {reached} but the plugin is at {expected}")]
    IncompleteMigration {
        plugin: String,
        reached: String,
        expected: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}
