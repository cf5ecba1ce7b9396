//! File backend driven by a single-outstanding-request AIO engine.
//!
//! [`AioBackend`] turns an [`AioEngine`], which accepts one request at a time
//! and signals completion separately, into the blocking [`Backend`] contract.
//! Every engine call sequence runs under a per-instance lock:
//!
//! 1. wait for any request still outstanding on the engine,
//! 2. submit the new request,
//! 3. block until it completes,
//! 4. for FUA writes, flush the resource.
//!
//! The lock makes the sequence safe when the protocol layer calls one backend
//! from several connection threads.
//!
//! # Capabilities
//!
//! [`Backend::has_fua`] and [`Backend::has_flush`] always report `false`,
//! even though FUA writes and [`Backend::flush`] both work. Trim is accepted
//! and reported as done but deallocates nothing.

use std::fmt;
use std::path::{Path, PathBuf};

use blockport_aio::{AioEngine, OpenFlags, ThreadedEngine};
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tracing::{info, trace, warn};

use crate::contract::{Backend, Geometry};
use crate::error::IoOp;
use crate::export::SYNC_PARAMETER;
use crate::{BackendError, BackendResult, ExportConfig, RequestContext};

/// Driver name the file backend registers under.
pub const DRIVER_NAME: &str = "aiofile";

/// The file backend with the default threaded engine.
pub type AioFileBackend = AioBackend<ThreadedEngine>;

enum State<E> {
    Open(E),
    Closed,
}

impl<E> State<E> {
    fn engine_mut(&mut self) -> BackendResult<&mut E> {
        match self {
            State::Open(engine) => Ok(engine),
            State::Closed => Err(BackendError::Closed),
        }
    }

    fn ensure_open(&self) -> BackendResult<()> {
        match self {
            State::Open(_) => Ok(()),
            State::Closed => Err(BackendError::Closed),
        }
    }
}

/// Backend that serializes block I/O through an [`AioEngine`].
pub struct AioBackend<E> {
    name: String,
    path: PathBuf,
    /// Size captured at construction; never refreshed.
    size: u64,
    flags: OpenFlags,
    state: Mutex<State<E>>,
}

impl AioFileBackend {
    /// Opens the file named by the export's `path` parameter.
    ///
    /// The file is opened read-only when the export is read-only, and with
    /// synchronous writes when the `sync` parameter is true.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Config`] if `path` is missing or `sync` is not a
    ///   boolean string.
    /// - [`BackendError::Open`] if the file cannot be opened or its size
    ///   cannot be read.
    pub fn open(config: &ExportConfig) -> BackendResult<Self> {
        let sync = config.flag(SYNC_PARAMETER)?;
        let path = config.path()?;

        let flags = if config.read_only {
            OpenFlags::read_only()
        } else {
            OpenFlags::read_write()
        }
        .with_sync(sync);

        let engine = ThreadedEngine::open(&path, flags).map_err(|source| BackendError::Open {
            path: path.clone(),
            source,
        })?;

        Self::from_engine(&config.name, path, engine, flags)
    }

    /// Registry constructor for the `aiofile` driver.
    pub fn construct(config: &ExportConfig) -> BackendResult<Box<dyn Backend>> {
        Ok(Box::new(Self::open(config)?))
    }
}

impl<E: AioEngine> AioBackend<E> {
    /// Wraps an engine whose resource is already open.
    ///
    /// The size is read from the resource's metadata now and fixed for the
    /// lifetime of the backend. If that fails the engine is closed before the
    /// error is returned.
    pub fn from_engine(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        mut engine: E,
        flags: OpenFlags,
    ) -> BackendResult<Self> {
        let name = name.into();
        let path = path.into();

        let size = match engine.file_size() {
            Ok(size) => size,
            Err(source) => {
                if let Err(error) = engine.close() {
                    warn!(export = %name, %error, "failed to release resource after metadata error");
                }
                return Err(BackendError::Open { path, source });
            }
        };

        info!(
            export = %name,
            path = %path.display(),
            size,
            read_only = !flags.write,
            sync = flags.sync,
            "opened aio backend"
        );

        Ok(Self {
            name,
            path,
            size,
            flags,
            state: Mutex::new(State::Open(engine)),
        })
    }

    /// Export name this backend serves.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the underlying resource.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes fixed at construction.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the resource was opened read-only.
    pub fn is_read_only(&self) -> bool {
        !self.flags.write
    }

    /// Whether the resource was opened with synchronous writes.
    pub fn is_sync(&self) -> bool {
        self.flags.sync
    }

    /// Whether [`Backend::close`] has run.
    pub fn is_closed(&self) -> bool {
        matches!(*self.state.lock(), State::Closed)
    }
}

impl<E: AioEngine> Backend for AioBackend<E> {
    fn write_at(
        &self,
        ctx: &RequestContext,
        buf: &[u8],
        offset: u64,
        fua: bool,
    ) -> BackendResult<usize> {
        ctx.check()?;
        let mut state = self.state.lock();
        let engine = state.engine_mut()?;
        ctx.check()?;

        engine.wait().map_err(BackendError::io(IoOp::Write))?;
        let id = engine
            .submit_write(Bytes::copy_from_slice(buf), offset)
            .map_err(BackendError::io(IoOp::Write))?;
        let completion = engine.wait_for(id).map_err(BackendError::io(IoOp::Write))?;

        if fua {
            engine
                .flush()
                .map_err(|source| BackendError::Persistence { source })?;
        }

        trace!(export = %self.name, %id, offset, bytes = completion.bytes, fua, "write");
        Ok(completion.bytes)
    }

    fn read_at(&self, ctx: &RequestContext, buf: &mut [u8], offset: u64) -> BackendResult<usize> {
        ctx.check()?;
        let mut state = self.state.lock();
        let engine = state.engine_mut()?;
        ctx.check()?;

        engine.wait().map_err(BackendError::io(IoOp::Read))?;
        let id = engine
            .submit_read(BytesMut::zeroed(buf.len()), offset)
            .map_err(BackendError::io(IoOp::Read))?;
        let completion = engine.wait_for(id).map_err(BackendError::io(IoOp::Read))?;

        let mut bytes = completion.bytes.min(buf.len());
        if let Some(data) = completion.data {
            bytes = bytes.min(data.len());
            buf[..bytes].copy_from_slice(&data[..bytes]);
        }

        trace!(export = %self.name, %id, offset, bytes, "read");
        Ok(bytes)
    }

    fn trim_at(&self, _ctx: &RequestContext, length: usize, offset: u64) -> BackendResult<usize> {
        self.state.lock().ensure_open()?;
        trace!(export = %self.name, offset, length, "trim accepted without deallocation");
        Ok(length)
    }

    fn flush(&self, ctx: &RequestContext) -> BackendResult<()> {
        ctx.check()?;
        let mut state = self.state.lock();
        let engine = state.engine_mut()?;
        engine.flush().map_err(BackendError::io(IoOp::Flush))
    }

    fn close(&self, _ctx: &RequestContext) -> BackendResult<()> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, State::Closed) {
            State::Closed => Err(BackendError::Closed),
            State::Open(mut engine) => {
                engine.close().map_err(BackendError::io(IoOp::Close))?;
                info!(export = %self.name, "closed aio backend");
                Ok(())
            }
        }
    }

    fn geometry(&self, _ctx: &RequestContext) -> BackendResult<Geometry> {
        self.state.lock().ensure_open()?;
        Ok(Geometry::with_default_blocks(self.size))
    }

    fn has_fua(&self, _ctx: &RequestContext) -> bool {
        false
    }

    fn has_flush(&self, _ctx: &RequestContext) -> bool {
        false
    }
}

impl<E> fmt::Debug for AioBackend<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never block on the state lock: it is held across in-flight I/O.
        let state: &dyn fmt::Debug = match self.state.try_lock() {
            Some(state) if matches!(*state, State::Closed) => &"closed",
            Some(_) => &"open",
            None => &"<busy>",
        };
        f.debug_struct("AioBackend")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("size", &self.size)
            .field("flags", &self.flags)
            .field("state", state)
            .finish()
    }
}
