//! CLI command implementations.

pub mod drivers;
pub mod exports;
pub mod inspect;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};
use blockport_config::{BlockportConfig, ConfigLoader};

/// Where commands read their configuration from.
pub struct ConfigSource {
    project_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl ConfigSource {
    pub fn new(project_dir: Option<PathBuf>, config_file: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            config_file,
        }
    }

    pub fn load(&self) -> Result<BlockportConfig> {
        if let Some(file) = &self.config_file {
            return BlockportConfig::from_toml_file(file)
                .with_context(|| format!("Failed to load {}", file.display()));
        }

        let mut loader = ConfigLoader::new();
        if let Some(dir) = &self.project_dir {
            loader = loader.with_project_dir(dir);
        }
        loader.load()
    }
}
