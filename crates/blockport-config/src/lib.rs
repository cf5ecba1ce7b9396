//! Configuration management for blockport
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (BLOCKPORT_* prefix, highest precedence)
//! 2. blockport.local.toml (gitignored, local overrides)
//! 3. blockport.toml (project config)
//! 4. ~/.config/blockport/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! Exports are listed as `[[exports]]` tables and deserialize straight into
//! [`ExportConfig`], the type backend constructors consume.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use blockport_backend::{ExportConfig, PATH_PARAMETER};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main blockport configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockportConfig {
    pub server: ServerConfig,
    pub exports: Vec<ExportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the protocol server listens on
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:10809".to_string(),
        }
    }
}

impl BlockportConfig {
    /// Load a single TOML file, without defaults layering or environment
    /// overrides. Relative paths resolve against the file's directory.
    ///
    /// Values are deserialized the same way [`ConfigLoader`] does, so scalar
    /// driver parameters such as `sync = true` read as strings here too.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load = |source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        };
        let mut config: Self = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .required(true)
                    .format(config::FileFormat::Toml),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(load)?;

        config.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Look up an export by name
    pub fn export(&self, name: &str) -> Option<&ExportConfig> {
        self.exports.iter().find(|export| export.name == name)
    }

    /// Check export names are present and unique and every export names a driver
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, export) in self.exports.iter().enumerate() {
            if export.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "export #{index} has no name"
                )));
            }
            if export.driver.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "export `{}` has no driver",
                    export.name
                )));
            }
            if !seen.insert(export.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate export `{}`",
                    export.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve relative export paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        for export in &mut self.exports {
            if let Some(path) = export.driver_parameters.get_mut(PATH_PARAMETER) {
                let candidate = PathBuf::from(path.as_str());
                if !path.is_empty() && candidate.is_relative() {
                    *path = base.join(candidate).to_string_lossy().into_owned();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aiofile(name: &str, path: &str) -> ExportConfig {
        ExportConfig::new(name, "aiofile").with_parameter(PATH_PARAMETER, path)
    }

    #[test]
    fn test_default_config() {
        let config = BlockportConfig::default();
        assert_eq!(config.server.address, "127.0.0.1:10809");
        assert!(config.exports.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_export_lookup() {
        let config = BlockportConfig {
            exports: vec![aiofile("disk0", "a.img"), aiofile("disk1", "b.img")],
            ..Default::default()
        };

        assert_eq!(config.export("disk1").unwrap().parameter("path"), Some("b.img"));
        assert!(config.export("disk2").is_none());
    }

    #[test]
    fn test_duplicate_exports_rejected() {
        let config = BlockportConfig {
            exports: vec![aiofile("disk0", "a.img"), aiofile("disk0", "b.img")],
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate export `disk0`"));
    }

    #[test]
    fn test_missing_name_or_driver_rejected() {
        let config = BlockportConfig {
            exports: vec![aiofile("", "a.img")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = BlockportConfig {
            exports: vec![ExportConfig::new("disk0", "")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_path_resolution() {
        let mut config = BlockportConfig {
            exports: vec![
                aiofile("relative", "images/disk0.img"),
                aiofile("absolute", "/srv/disk1.img"),
                ExportConfig::new("pathless", "aiofile"),
            ],
            ..Default::default()
        };
        config.resolve_paths("/home/user/project");

        assert_eq!(
            config.export("relative").unwrap().parameter("path"),
            Some("/home/user/project/images/disk0.img")
        );
        assert_eq!(
            config.export("absolute").unwrap().parameter("path"),
            Some("/srv/disk1.img")
        );
        assert_eq!(config.export("pathless").unwrap().parameter("path"), None);
    }

    #[test]
    fn test_from_toml_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("exports.toml");
        std::fs::write(
            &file,
            r#"
[server]
address = "0.0.0.0:10809"

[[exports]]
name = "disk0"
driver = "aiofile"
read_only = true
[exports.driver_parameters]
path = "disk0.img"
sync = "true"
"#,
        )
        .expect("Failed to write config");

        let config = BlockportConfig::from_toml_file(&file).expect("Failed to load config");
        let export = config.export("disk0").unwrap();
        assert_eq!(config.server.address, "0.0.0.0:10809");
        assert!(export.read_only);
        assert_eq!(
            export.path().unwrap(),
            temp_dir.path().join("disk0.img")
        );
    }

    #[test]
    fn test_both_loaders_accept_unquoted_parameters() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("blockport.toml");
        std::fs::write(
            &file,
            r#"
[[exports]]
name = "disk0"
driver = "aiofile"
[exports.driver_parameters]
path = "disk0.img"
sync = true
"#,
        )
        .expect("Failed to write config");

        let single = BlockportConfig::from_toml_file(&file).expect("Failed to load file");
        let layered = ConfigLoader::new()
            .with_project_dir(temp_dir.path())
            .without_user_config()
            .load()
            .expect("Failed to load project");

        for config in [&single, &layered] {
            let export = config.export("disk0").unwrap();
            assert_eq!(export.parameter("sync"), Some("true"));
            assert!(export.flag("sync").unwrap());
            assert_eq!(export.path().unwrap(), temp_dir.path().join("disk0.img"));
        }
        assert_eq!(single.exports, layered.exports);
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("exports.toml");
        std::fs::write(
            &file,
            r#"
[[exports]]
name = "disk0"
driver = ""
"#,
        )
        .expect("Failed to write config");

        assert!(matches!(
            BlockportConfig::from_toml_file(&file),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_toml_file_errors() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            BlockportConfig::from_toml_file(&missing),
            Err(ConfigError::Load { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "[[exports]\nname = ").expect("Failed to write config");
        assert!(matches!(
            BlockportConfig::from_toml_file(&broken),
            Err(ConfigError::Load { .. })
        ));
    }
}
