//! # Cadence Store
//!
//! Durable snapshot persistence and the local store for Cadence.
//!
//! This crate provides:
//! - A backend trait over opaque whole-document byte slots
//! - A file backend with atomic writes and an advisory directory lock
//! - An in-memory backend for tests
//! - `LocalStore`, the owner of the canonical snapshot and its cache
//! - A save feed the sync layer subscribes to
//!
//! ## Guarantees
//!
//! - A save is all-or-nothing from the reader's perspective; no partial
//!   or interleaved write is ever observable
//! - Loading never fails: corrupt or missing persisted data falls back
//!   to schema defaults
//! - Every mutation is a read-modify-write of the whole snapshot under
//!   the cache lock, so overlapping operations cannot lose updates

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod feed;
mod file;
mod memory;
mod store;

pub use backend::{Slot, SnapshotBackend};
pub use error::{StoreError, StoreResult};
pub use feed::{SaveEvent, SaveFeed};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::LocalStore;
