//! Error types for the parts of the crate that touch the outside world.
//!
//! The annotation controller itself never fails; these cover configuration,
//! the sidecar file and PNG export.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::LayerConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside what the layer can work with
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A key binding names a command that does not exist
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// A key binding string could not be parsed
    #[error("invalid key binding `{0}`")]
    InvalidKey(String),
}

/// Sidecar persistence error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed text layer file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("text layer file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
