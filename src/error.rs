use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GdkitError {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {key}: '{value}' (expected an http(s) URL)")]
    InvalidUrl { key: &'static str, value: String },

    #[error("unable to derive a configuration directory from the current environment")]
    MissingConfigDirectory,
}
