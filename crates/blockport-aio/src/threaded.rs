//! Worker-thread engine using positional file I/O.
//!
//! Each [`ThreadedEngine`] owns one OS file and one worker thread. Requests
//! travel to the worker over a bounded channel of capacity one and the
//! results come back over a second one, so the channel depth is the same as
//! the engine's single-outstanding-request limit. The worker performs
//! `pread`/`pwrite` on Unix (`seek_read`/`seek_write` on Windows); the caller
//! only ever blocks in [`AioEngine::wait_for`].

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::{Bytes, BytesMut};
use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, trace};

use crate::AioError;
use crate::engine::{AioEngine, Completion, Direction, OpenFlags, RequestId};

enum Op {
    Read(BytesMut),
    Write(Bytes),
}

struct Request {
    id: RequestId,
    offset: u64,
    op: Op,
}

struct Response {
    id: RequestId,
    result: Result<Completion, AioError>,
}

/// Asynchronous I/O engine backed by a dedicated worker thread.
#[derive(Debug)]
pub struct ThreadedEngine {
    path: PathBuf,
    /// The open file. `None` once the engine is closed.
    file: Option<Arc<File>>,
    next_id: u64,
    pending: Option<RequestId>,
    submit_tx: Option<Sender<Request>>,
    complete_rx: Receiver<Response>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedEngine {
    /// Opens `path` with the given flags and starts the worker thread.
    ///
    /// The file must already exist; it is never created.
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self, AioError> {
        let path = path.as_ref();
        let mut opts = OpenOptions::new();
        opts.read(true);
        if flags.write {
            opts.write(true);
        }

        #[cfg(unix)]
        if flags.sync {
            use std::os::unix::fs::OpenOptionsExt;
            opts.custom_flags(libc::O_SYNC);
        }

        let file = opts.open(path)?;
        Self::from_file(path, file)
    }

    /// Wraps an already open file and starts the worker thread.
    pub fn from_file(path: impl Into<PathBuf>, file: File) -> Result<Self, AioError> {
        let path = path.into();
        let file = Arc::new(file);

        let (submit_tx, submit_rx) = channel::bounded::<Request>(1);
        let (complete_tx, complete_rx) = channel::bounded::<Response>(1);

        let worker_file = Arc::clone(&file);
        let worker = thread::Builder::new()
            .name("blockport-aio".to_string())
            .spawn(move || run_worker(&worker_file, &submit_rx, &complete_tx))?;

        debug!(path = %path.display(), "spawned I/O worker");

        Ok(Self {
            path,
            file: Some(file),
            next_id: 1,
            pending: None,
            submit_tx: Some(submit_tx),
            complete_rx,
            worker: Some(worker),
        })
    }

    /// Returns the path this engine was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once [`AioEngine::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn file(&self) -> Result<&File, AioError> {
        self.file.as_deref().ok_or(AioError::Closed)
    }

    fn submit(&mut self, offset: u64, op: Op) -> Result<RequestId, AioError> {
        let tx = self.submit_tx.as_ref().ok_or(AioError::Closed)?;
        if let Some(pending) = self.pending {
            return Err(AioError::Busy { pending });
        }

        let id = RequestId::new(self.next_id);
        tx.send(Request { id, offset, op })
            .map_err(|_| AioError::WorkerGone)?;
        self.next_id += 1;
        self.pending = Some(id);

        trace!(%id, offset, "submitted request");
        Ok(id)
    }
}

impl AioEngine for ThreadedEngine {
    fn submit_read(&mut self, buf: BytesMut, offset: u64) -> Result<RequestId, AioError> {
        self.submit(offset, Op::Read(buf))
    }

    fn submit_write(&mut self, buf: Bytes, offset: u64) -> Result<RequestId, AioError> {
        self.submit(offset, Op::Write(buf))
    }

    fn wait_for(&mut self, id: RequestId) -> Result<Completion, AioError> {
        self.file()?;
        if self.pending != Some(id) {
            return Err(AioError::UnknownRequest { id });
        }

        let response = self.complete_rx.recv();
        self.pending = None;
        let response = response.map_err(|_| AioError::WorkerGone)?;
        debug_assert_eq!(response.id, id, "completion for a request that was not pending");

        trace!(%id, ok = response.result.is_ok(), "request completed");
        response.result
    }

    fn wait(&mut self) -> Result<(), AioError> {
        self.file()?;
        match self.pending {
            Some(id) => self.wait_for(id).map(|_| ()),
            None => Ok(()),
        }
    }

    fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    fn flush(&mut self) -> Result<(), AioError> {
        self.wait()?;
        self.file()?.sync_all()?;
        Ok(())
    }

    fn file_size(&self) -> Result<u64, AioError> {
        let metadata = self.file()?.metadata()?;
        Ok(metadata.len())
    }

    fn close(&mut self) -> Result<(), AioError> {
        self.file()?;
        let drained = self.wait();

        // Dropping the sender ends the worker's receive loop.
        self.submit_tx = None;
        self.file = None;
        self.pending = None;

        let joined = match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| AioError::WorkerPanicked),
            None => Ok(()),
        };

        debug!(path = %self.path.display(), "closed I/O engine");
        drained.and(joined)
    }
}

impl Drop for ThreadedEngine {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(error) = self.close() {
            debug!(path = %self.path.display(), %error, "error closing I/O engine on drop");
        }
    }
}

fn run_worker(file: &File, requests: &Receiver<Request>, completions: &Sender<Response>) {
    for Request { id, offset, op } in requests {
        let result = execute(file, id, offset, op);
        if completions.send(Response { id, result }).is_err() {
            break;
        }
    }
    debug!("I/O worker exiting");
}

fn execute(file: &File, id: RequestId, offset: u64, op: Op) -> Result<Completion, AioError> {
    match op {
        Op::Read(mut buf) => {
            let bytes = read_at(file, &mut buf, offset)?;
            Ok(Completion {
                id,
                direction: Direction::Read,
                bytes,
                data: Some(buf),
            })
        }
        Op::Write(buf) => {
            let bytes = write_at(file, &buf, offset)?;
            Ok(Completion {
                id,
                direction: Direction::Write,
                bytes,
                data: None,
            })
        }
    }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}
