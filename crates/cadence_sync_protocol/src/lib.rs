//! # Cadence Sync Protocol
//!
//! Wire types for the Cadence sync protocol.
//!
//! This crate defines the JSON bodies exchanged with the sync server:
//! - `POST /sync/push` - [`PushRequest`] / [`PushResponse`]
//! - `GET /sync/pull?since=…` - [`PullResponse`]
//!
//! It is a pure protocol crate: serde types and snapshot conversions,
//! no I/O and no policy. The merge policy lives in `cadence_core`; the
//! transports live in `cadence_sync_engine`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod messages;

pub use messages::{MergedState, PullResponse, PushRequest, PushResponse};
