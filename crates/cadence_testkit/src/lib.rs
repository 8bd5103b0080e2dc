//! # Cadence Testkit
//!
//! Test utilities for Cadence.
//!
//! This crate provides:
//! - Snapshot, session, and record fixtures with hand-picked ids and
//!   timestamps
//! - Property-based generators (proptest strategies) producing valid,
//!   canonical snapshots
//!
//! The merge-law property tests live in this crate's `tests/` directory
//! and exercise `cadence_core::merge` through the generators.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
