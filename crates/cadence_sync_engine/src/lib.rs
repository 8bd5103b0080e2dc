//! # Cadence Sync Engine
//!
//! The sync client for Cadence: decides *when* to talk to the remote
//! endpoint, never *how* conflicts resolve (that is `cadence_core::merge`).
//!
//! This crate provides:
//! - A session gate consulted fresh before every sync decision
//! - An async transport abstraction with HTTP, mock, and in-process
//!   reference implementations
//! - A cancellable, reschedulable debounce timer
//! - `SyncClient`, orchestrating debounced pushes and pull-and-merge
//!   with observable status
//!
//! ## Key invariants
//!
//! - Sync is a silent no-op while the session gate reports
//!   unauthenticated; the gate is never cached
//! - Bursts of local mutations collapse into one push per quiet period
//! - A failed push or pull never corrupts or partially applies state;
//!   it is retried on the next natural trigger
//! - Applying a pulled-and-merged snapshot never queues a push
//! - Pushes are not serialized against pulls; the merge engine's
//!   idempotence and commutativity make the overlap converge

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod debounce;
mod error;
mod http;
mod session;
mod transport;

pub use client::{SyncClient, SyncClientConfig, SyncState, SyncStatus};
pub use debounce::Debouncer;
pub use error::{SyncError, SyncResult};
pub use http::HttpTransport;
pub use session::{SessionGate, StaticGate, ToggleGate};
pub use transport::{MemoryRemote, MockTransport, SyncTransport};
