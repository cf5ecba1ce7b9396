//! Per-request context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{BackendError, BackendResult};

/// Context passed to every backend call.
///
/// Clones share one cancellation flag, so the protocol layer can keep a clone
/// and cancel a request that is queued behind another caller. Cancellation is
/// only observed before a request is submitted to the engine; a submitted
/// request always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    /// Creates a context that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this context and all of its clones as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true if [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns [`BackendError::Cancelled`] if the context is cancelled.
    pub fn check(&self) -> BackendResult<()> {
        if self.is_cancelled() {
            Err(BackendError::Cancelled)
        } else {
            Ok(())
        }
    }
}
