//! # blockport-aio: single-outstanding-request asynchronous I/O
//!
//! This crate provides the asynchronous I/O primitive that blockport storage
//! backends are built on. An engine accepts one positional read or write at
//! a time, hands back a [`RequestId`], and lets the caller block until that
//! request completes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       blockport-backend      │
//! │  (AioBackend: wait, submit,  │
//! │       wait_for, flush)       │
//! └──────────────┬───────────────┘
//!                │ AioEngine
//! ┌──────────────┴───────────────┐
//! │         blockport-aio        │
//! │  ThreadedEngine ──► worker   │
//! │      bounded(1) channels     │
//! └──────────────────────────────┘
//! ```
//!
//! Engines never create files. Opening with [`OpenFlags::sync`] set requests
//! `O_SYNC` on Unix.

mod engine;
mod error;
mod threaded;

pub use engine::{AioEngine, Completion, Direction, OpenFlags, RequestId};
pub use error::AioError;
pub use threaded::ThreadedEngine;

#[cfg(test)]
mod tests;
