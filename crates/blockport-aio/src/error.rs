//! Engine error types.

use crate::RequestId;

/// Errors from the asynchronous I/O engine.
#[derive(Debug, thiserror::Error)]
pub enum AioError {
    /// Underlying OS I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A request was submitted while another one is still outstanding.
    #[error("request {pending} is still outstanding")]
    Busy { pending: RequestId },

    /// `wait_for` was called with an identifier that is not pending.
    #[error("request {id} is not pending")]
    UnknownRequest { id: RequestId },

    /// The engine has been closed.
    #[error("engine is closed")]
    Closed,

    /// The worker thread exited while a request was outstanding.
    #[error("I/O worker exited unexpectedly")]
    WorkerGone,

    /// The worker thread panicked.
    #[error("I/O worker panicked")]
    WorkerPanicked,
}

impl AioError {
    /// Returns the raw OS error code if this error came from the kernel.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            AioError::Io { source } => source.raw_os_error(),
            _ => None,
        }
    }
}
