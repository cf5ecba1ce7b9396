//! The backend contract consumed by the protocol layer.

use crate::{BackendResult, RequestContext};

/// Minimum block size advertised by block backends (bytes).
pub const MIN_BLOCK_SIZE: u64 = 1;

/// Preferred block size advertised by block backends (32 KiB).
pub const PREFERRED_BLOCK_SIZE: u64 = 32 * 1024;

/// Maximum block size advertised by block backends (128 MiB).
pub const MAX_BLOCK_SIZE: u64 = 128 * 1024 * 1024;

/// Size and block-size parameters a backend advertises to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Total size in bytes
    pub size: u64,
    /// Minimum block size
    pub min_block_size: u64,
    /// Preferred block size
    pub preferred_block_size: u64,
    /// Maximum block size
    pub max_block_size: u64,
}

impl Geometry {
    /// Geometry of `size` bytes with the fixed block-size policy.
    pub fn with_default_blocks(size: u64) -> Self {
        Self {
            size,
            min_block_size: MIN_BLOCK_SIZE,
            preferred_block_size: PREFERRED_BLOCK_SIZE,
            max_block_size: MAX_BLOCK_SIZE,
        }
    }
}

/// A storage backend behind one export.
///
/// Every call blocks the calling thread until the underlying I/O has
/// completed. Implementations must be safe to call from several threads;
/// they serialize internally where the storage requires it.
pub trait Backend: Send + Sync {
    /// Writes `buf` at `offset`, flushing afterwards when `fua` is set.
    ///
    /// Returns the number of bytes written.
    fn write_at(
        &self,
        ctx: &RequestContext,
        buf: &[u8],
        offset: u64,
        fua: bool,
    ) -> BackendResult<usize>;

    /// Reads into `buf` from `offset`.
    ///
    /// Returns the number of bytes read.
    fn read_at(&self, ctx: &RequestContext, buf: &mut [u8], offset: u64) -> BackendResult<usize>;

    /// Discards `length` bytes at `offset`.
    ///
    /// Returns the number of bytes trimmed.
    fn trim_at(&self, ctx: &RequestContext, length: usize, offset: u64) -> BackendResult<usize>;

    /// Forces buffered writes to durable storage.
    fn flush(&self, ctx: &RequestContext) -> BackendResult<()>;

    /// Releases the backend. Every later call fails.
    fn close(&self, ctx: &RequestContext) -> BackendResult<()>;

    /// Returns the advertised geometry.
    fn geometry(&self, ctx: &RequestContext) -> BackendResult<Geometry>;

    /// Whether the backend advertises force-unit-access writes.
    fn has_fua(&self, ctx: &RequestContext) -> bool;

    /// Whether the backend advertises flush.
    fn has_flush(&self, ctx: &RequestContext) -> bool;
}
