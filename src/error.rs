//! Error types for netpanel.

use std::path::PathBuf;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the connection manager.
///
/// Connection-manager failures use [`crate::backend::BackendError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration validation failed.
    #[error("config validation failed:\n{}", .0.join("\n"))]
    ConfigValidation(Vec<String>),

    /// A settings key contains characters that cannot be used as a file name.
    #[error("invalid settings key: {0:?}")]
    InvalidKey(String),

    /// Reading or writing a persisted setting failed.
    #[error("settings store error for {key}: {source}")]
    Settings {
        key: String,
        source: std::io::Error,
    },
}
