//! Export configuration consumed by backend constructors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{BackendError, BackendResult};

/// Driver parameter naming the resource to open.
pub const PATH_PARAMETER: &str = "path";

/// Driver parameter requesting synchronous writes.
pub const SYNC_PARAMETER: &str = "sync";

/// How to open the backend behind one export.
///
/// Owned and validated by the configuration layer; backends only read it
/// while they are being constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export name clients ask for
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Registered driver name, e.g. `aiofile`
    pub driver: String,
    /// Open the resource read-only
    #[serde(default)]
    pub read_only: bool,
    /// Driver-specific string parameters
    #[serde(default)]
    pub driver_parameters: BTreeMap<String, String>,
}

impl ExportConfig {
    /// Creates an export using `driver` with no parameters.
    pub fn new(name: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            driver: driver.into(),
            read_only: false,
            driver_parameters: BTreeMap::new(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Makes the export read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Sets a driver parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.driver_parameters.insert(key.into(), value.into());
        self
    }

    /// Returns a driver parameter, if set.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.driver_parameters.get(key).map(String::as_str)
    }

    /// Reads a boolean driver parameter. Absent or empty means `false`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if the value is not a boolean string.
    pub fn flag(&self, key: &str) -> BackendResult<bool> {
        match self.parameter(key) {
            None | Some("") => Ok(false),
            Some(value) => parse_bool(value).ok_or_else(|| {
                BackendError::config(key, format!("expected a boolean, got `{value}`"))
            }),
        }
    }

    /// Returns the `path` driver parameter.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if the parameter is absent or empty.
    pub fn path(&self) -> BackendResult<PathBuf> {
        match self.parameter(PATH_PARAMETER) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Err(BackendError::config(PATH_PARAMETER, "missing resource path")),
        }
    }
}

/// Parses the boolean spellings accepted in driver parameters.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
