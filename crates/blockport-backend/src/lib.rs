//! # blockport-backend: storage backends for a network block device server
//!
//! This crate defines the [`Backend`] contract a block-device protocol server
//! drives for each export, the [`BackendRegistry`] that maps driver names to
//! constructors, and the `aiofile` driver: [`AioBackend`], which serves an
//! export from a file through a single-outstanding-request AIO engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   ExportConfig   ┌──────────────────┐
//! │ protocol server │ ───────────────► │ BackendRegistry  │
//! └────────┬────────┘                  │  "aiofile" ──┐   │
//!          │ Backend                   └──────────────┼───┘
//!          ▼                                          │
//! ┌─────────────────────────────┐                     │
//! │ AioBackend                  │ ◄───────────────────┘
//! │  Mutex<engine>              │
//! │  wait → submit → wait_for   │
//! └────────┬────────────────────┘
//!          │ AioEngine
//! ┌────────▼────────┐
//! │ ThreadedEngine  │  (blockport-aio)
//! └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use blockport_backend::{BackendRegistry, ExportConfig, RequestContext};
//!
//! let registry = BackendRegistry::with_defaults();
//! let export = ExportConfig::new("disk0", "aiofile")
//!     .with_parameter("path", "/var/lib/blockport/disk0.img");
//!
//! let backend = registry.construct(&export)?;
//! let ctx = RequestContext::new();
//!
//! backend.write_at(&ctx, &[0xAB; 32], 100, false)?;
//! let mut buf = [0u8; 32];
//! backend.read_at(&ctx, &mut buf, 100)?;
//! backend.close(&ctx)?;
//! # Ok::<(), blockport_backend::BackendError>(())
//! ```

mod aiofile;
mod context;
mod contract;
mod error;
mod export;
mod registry;

pub use aiofile::{AioBackend, AioFileBackend, DRIVER_NAME as AIOFILE_DRIVER};
pub use context::RequestContext;
pub use contract::{Backend, Geometry, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, PREFERRED_BLOCK_SIZE};
pub use error::{BackendError, BackendResult, IoOp};
pub use export::{ExportConfig, PATH_PARAMETER, SYNC_PARAMETER, parse_bool};
pub use registry::{BackendConstructor, BackendRegistry};
