//! Engine trait.
//!
//! The [`AioEngine`] trait describes an asynchronous I/O primitive that
//! accepts **one** read or write request at a time. A submission returns a
//! [`RequestId`]; the caller later blocks on that identifier with
//! [`AioEngine::wait_for`]. Submitting while a request is still outstanding
//! is not supported and is rejected with [`AioError::Busy`].
//!
//! Buffers are moved into the engine on submission and, for reads, handed
//! back in the [`Completion`]. This keeps the memory alive for as long as the
//! request is in flight without borrowing across the submission boundary.

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::AioError;

/// Identifier of a submitted request.
///
/// Identifiers are unique per engine and increase monotonically from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request identifier from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Positional read.
    Read,
    /// Positional write.
    Write,
}

/// Result of a finished request.
#[derive(Debug)]
pub struct Completion {
    /// The request this completion belongs to.
    pub id: RequestId,
    /// Direction of the request.
    pub direction: Direction,
    /// Number of bytes transferred.
    pub bytes: usize,
    /// The filled buffer, for reads.
    pub data: Option<BytesMut>,
}

/// Flags for opening the resource behind an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    /// Open for writing as well as reading.
    pub write: bool,
    /// Request synchronous writes (`O_SYNC` on Unix, ignored elsewhere).
    pub sync: bool,
}

impl OpenFlags {
    /// Flags for a read-only open.
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Flags for a read-write open.
    pub fn read_write() -> Self {
        Self {
            write: true,
            ..Self::default()
        }
    }

    /// Additionally requests synchronous writes.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Asynchronous I/O with at most one outstanding request.
///
/// Implementations are owned by exactly one caller at a time; every method
/// takes `&mut self` and the trait only requires `Send` so an engine can be
/// moved behind a lock.
pub trait AioEngine: Send {
    /// Submits a read of `buf.len()` bytes at `offset`.
    ///
    /// The buffer is returned, filled, in the [`Completion`].
    fn submit_read(&mut self, buf: BytesMut, offset: u64) -> Result<RequestId, AioError>;

    /// Submits a write of `buf` at `offset`.
    fn submit_write(&mut self, buf: Bytes, offset: u64) -> Result<RequestId, AioError>;

    /// Blocks until the request `id` completes and returns its result.
    fn wait_for(&mut self, id: RequestId) -> Result<Completion, AioError>;

    /// Blocks until no request is outstanding.
    ///
    /// Returns the error of the drained request, if it failed. Returns
    /// `Ok(())` immediately when nothing is pending.
    fn wait(&mut self) -> Result<(), AioError>;

    /// Returns the identifier of the outstanding request, if any.
    fn pending(&self) -> Option<RequestId>;

    /// Forces written data to durable storage.
    fn flush(&mut self) -> Result<(), AioError>;

    /// Returns the current size of the underlying resource from its metadata.
    fn file_size(&self) -> Result<u64, AioError>;

    /// Releases the engine and the underlying resource.
    ///
    /// Any outstanding request is drained first. Every later call returns
    /// [`AioError::Closed`].
    fn close(&mut self) -> Result<(), AioError>;
}
