//! Driver-name to constructor table.
//!
//! The registry is built explicitly at startup and handed to whatever turns
//! export configurations into backends. There is no process-wide table and
//! no load-time self-registration.
//!
//! # Example
//!
//! ```
//! use blockport_backend::{BackendRegistry, ExportConfig};
//!
//! let registry = BackendRegistry::with_defaults();
//! assert!(registry.contains("aiofile"));
//!
//! let export = ExportConfig::new("disk0", "ramdisk");
//! assert!(registry.construct(&export).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::aiofile::{self, AioFileBackend};
use crate::{Backend, BackendError, BackendResult, ExportConfig};

/// Builds a backend from an export configuration.
pub type BackendConstructor =
    Arc<dyn Fn(&ExportConfig) -> BackendResult<Box<dyn Backend>> + Send + Sync>;

/// Maps driver names to backend constructors.
///
/// `Clone` is cheap: constructors are reference counted.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: HashMap<String, BackendConstructor>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every driver this crate ships.
    pub fn with_defaults() -> Self {
        Self::new().with_driver(aiofile::DRIVER_NAME, AioFileBackend::construct)
    }

    /// Adds a driver. Builder form of [`register`](Self::register).
    pub fn with_driver<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&ExportConfig) -> BackendResult<Box<dyn Backend>> + Send + Sync + 'static,
    {
        self.register(name, constructor);
        self
    }

    /// Adds a driver, returning the constructor it replaced, if any.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        constructor: F,
    ) -> Option<BackendConstructor>
    where
        F: Fn(&ExportConfig) -> BackendResult<Box<dyn Backend>> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor))
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered driver names, sorted.
    pub fn drivers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the backend for `export` with its driver's constructor.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnknownDriver`] if the driver is not
    /// registered, otherwise whatever the constructor returns.
    pub fn construct(&self, export: &ExportConfig) -> BackendResult<Box<dyn Backend>> {
        let constructor = self
            .constructors
            .get(&export.driver)
            .ok_or_else(|| BackendError::UnknownDriver(export.driver.clone()))?;

        debug!(export = %export.name, driver = %export.driver, "constructing backend");
        constructor(export)
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("drivers", &self.drivers())
            .finish()
    }
}
