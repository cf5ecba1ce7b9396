//! Backend error types.

use std::fmt;
use std::path::PathBuf;

use blockport_aio::AioError;
use thiserror::Error;

/// Backend result type
pub type BackendResult<T> = Result<T, BackendError>;

/// The engine operation an I/O error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    /// Positional read
    Read,
    /// Positional write
    Write,
    /// Explicit flush
    Flush,
    /// Engine shutdown
    Close,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoOp::Read => write!(f, "read"),
            IoOp::Write => write!(f, "write"),
            IoOp::Flush => write!(f, "flush"),
            IoOp::Close => write!(f, "close"),
        }
    }
}

/// Errors returned by backends and the backend registry.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A driver parameter is missing or cannot be parsed.
    #[error("invalid driver parameter `{parameter}`: {reason}")]
    Config { parameter: String, reason: String },

    /// The resource could not be opened or its metadata read.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: AioError,
    },

    /// The engine failed to submit or complete a request.
    #[error("{op} failed: {source}")]
    Io {
        op: IoOp,
        #[source]
        source: AioError,
    },

    /// The durability flush after a FUA write failed.
    #[error("durability flush after write failed: {source}")]
    Persistence {
        #[source]
        source: AioError,
    },

    /// The backend has been closed.
    #[error("backend is closed")]
    Closed,

    /// The request context was cancelled before submission.
    #[error("request cancelled")]
    Cancelled,

    /// No constructor is registered under this driver name.
    #[error("no backend driver registered as `{0}`")]
    UnknownDriver(String),
}

impl BackendError {
    pub(crate) fn io(op: IoOp) -> impl FnOnce(AioError) -> Self {
        move |source| BackendError::Io { op, source }
    }

    pub(crate) fn config(parameter: &str, reason: impl Into<String>) -> Self {
        BackendError::Config {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    /// Closest POSIX errno, for protocol layers that report errno values.
    pub fn errno(&self) -> i32 {
        match self {
            BackendError::Config { .. } => libc::EINVAL,
            BackendError::Open { source, .. } => source.raw_os_error().unwrap_or(libc::EIO),
            BackendError::Io { source, .. } | BackendError::Persistence { source } => {
                source.raw_os_error().unwrap_or(libc::EIO)
            }
            BackendError::Closed => libc::EBADF,
            BackendError::Cancelled => libc::ECANCELED,
            BackendError::UnknownDriver(_) => libc::ENOENT,
        }
    }
}
