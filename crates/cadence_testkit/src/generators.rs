//! Property-based generators using proptest.
//!
//! Strategies produce data that holds the invariants merges rely on:
//! ids are non-empty, timestamps are zero-padded UTC, and generated
//! snapshots are canonical (unique session ids, history sorted newest
//! first), since that is the shape every store- or merge-produced
//! snapshot has.

use cadence_core::{MetricValue, PersonalRecords, Snapshot, WorkoutSession};
use proptest::collection::{btree_map, btree_set, vec};
use proptest::prelude::*;

/// Strategy for stable record ids.
pub fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-f0-9]{8}-[a-f0-9]{4}").expect("invalid id regex")
}

/// Strategy for zero-padded UTC ISO-8601 timestamps.
pub fn timestamp_strategy() -> impl Strategy<Value = String> {
    (
        2020..2030i32,
        1..=12u32,
        1..=28u32,
        0..24u32,
        0..60u32,
        0..60u32,
    )
        .prop_map(|(year, month, day, hour, minute, second)| {
            format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
        })
}

/// Strategy for personal-record leaves, mostly numeric with the
/// occasional opaque value.
pub fn metric_value_strategy() -> impl Strategy<Value = MetricValue> {
    prop_oneof![
        4 => (0.0..10_000.0f64).prop_map(MetricValue::Number),
        1 => "[a-z]{1,8}".prop_map(|s| MetricValue::Other(serde_json::Value::String(s))),
    ]
}

/// Strategy for a personal-records map.
pub fn personal_records_strategy() -> impl Strategy<Value = PersonalRecords> {
    btree_map(
        "[a-z]{3,10}",
        btree_map("[a-z]{3,8}", metric_value_strategy(), 0..4),
        0..4,
    )
}

/// Strategy for a single history session.
pub fn session_strategy() -> impl Strategy<Value = WorkoutSession> {
    (id_strategy(), timestamp_strategy()).prop_map(|(id, completed_at)| WorkoutSession {
        id,
        workout_id: "w1".into(),
        workout_name: "Generated".into(),
        completed_at,
        ..WorkoutSession::default()
    })
}

/// Strategy for a canonical history: unique ids, sorted by completion
/// time descending with the id as tie-break.
pub fn history_strategy() -> impl Strategy<Value = Vec<WorkoutSession>> {
    (btree_set(id_strategy(), 0..8), vec(timestamp_strategy(), 8)).prop_map(|(ids, times)| {
        let mut history: Vec<WorkoutSession> = ids
            .into_iter()
            .zip(times)
            .map(|(id, completed_at)| WorkoutSession {
                id,
                completed_at,
                ..WorkoutSession::default()
            })
            .collect();
        history.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        history
    })
}

/// Strategy for whole canonical snapshots.
pub fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    (
        "[A-Za-z]{0,12}",
        history_strategy(),
        personal_records_strategy(),
        btree_set(id_strategy(), 0..4),
        timestamp_strategy(),
    )
        .prop_map(|(name, history, personal_records, workout_ids, updated_at)| {
            let mut snapshot = Snapshot::default();
            snapshot.user.name = name;
            snapshot.history = history;
            snapshot.personal_records = personal_records;
            snapshot.custom_workouts = workout_ids
                .into_iter()
                .map(|id| cadence_core::CustomWorkout {
                    name: format!("workout {id}"),
                    id,
                    ..cadence_core::CustomWorkout::default()
                })
                .collect();
            snapshot.updated_at = updated_at;
            snapshot
        })
}
