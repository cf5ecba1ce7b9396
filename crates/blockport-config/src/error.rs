//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config file at {path}: {source}")]
    Load {
        path: PathBuf,
        source: config::ConfigError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No home directory to place `~/.config/blockport` under.
    #[error("Failed to determine user config directory")]
    NoUserConfigDir,
}
