//! # Cadence Core
//!
//! Snapshot data model and merge engine for Cadence.
//!
//! This crate provides:
//! - The `Snapshot` document and its record types
//! - Zero-padded UTC timestamp validation for last-write-wins ordering
//! - The pure conflict-resolution merge engine
//!
//! ## Merge policy
//!
//! Two divergent snapshots reconcile deterministically, field by field:
//! - Profile and settings move as whole objects, last write wins
//! - Personal-record numeric leaves take the maximum of both sides
//! - Custom workouts union by id, local winning on collision
//! - Workout history unions by id with no overwrite and no mutation
//!
//! The merge is a pure function of its inputs. Re-merging the same inputs
//! in either order, or repeatedly, converges to the same state, which is
//! what lets the sync layer overlap pushes and pulls without locking.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod merge;
pub mod timestamp;
mod types;

pub use error::{CoreError, CoreResult};
pub use merge::{merge, merge_with_report, MergeReport};
pub use types::{
    CustomWorkout, ExerciseResult, MetricValue, PersonalRecords, Settings, Snapshot, UserProfile,
    WorkoutSession,
};
