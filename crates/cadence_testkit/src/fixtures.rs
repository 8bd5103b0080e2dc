//! Hand-built fixtures for store, merge, and sync tests.

use cadence_core::{
    CustomWorkout, MetricValue, PersonalRecords, Snapshot, UserProfile, WorkoutSession,
};
use std::collections::BTreeMap;

/// A history session with the given id and completion time.
#[must_use]
pub fn session(id: &str, completed_at: &str) -> WorkoutSession {
    WorkoutSession {
        id: id.into(),
        workout_id: "w1".into(),
        workout_name: "Morning Routine".into(),
        completed_at: completed_at.into(),
        ..WorkoutSession::default()
    }
}

/// A custom workout with the given id and name.
#[must_use]
pub fn custom_workout(id: &str, name: &str) -> CustomWorkout {
    CustomWorkout {
        id: id.into(),
        name: name.into(),
        ..CustomWorkout::default()
    }
}

/// A profile with the given display name.
#[must_use]
pub fn profile(name: &str) -> UserProfile {
    UserProfile {
        name: name.into(),
        ..UserProfile::default()
    }
}

/// An otherwise-default snapshot saved at the given time.
#[must_use]
pub fn snapshot_at(updated_at: &str) -> Snapshot {
    Snapshot {
        updated_at: updated_at.into(),
        ..Snapshot::default()
    }
}

/// A snapshot whose history holds the given `(id, completed_at)` pairs,
/// in the given order.
#[must_use]
pub fn snapshot_with_history(sessions: &[(&str, &str)]) -> Snapshot {
    Snapshot {
        history: sessions
            .iter()
            .map(|(id, completed_at)| session(id, completed_at))
            .collect(),
        ..Snapshot::default()
    }
}

/// Personal records from `(exercise, metric, value)` triples.
#[must_use]
pub fn records(entries: &[(&str, &str, f64)]) -> PersonalRecords {
    let mut map = PersonalRecords::new();
    for (exercise, metric, value) in entries {
        map.entry((*exercise).to_string())
            .or_insert_with(BTreeMap::new)
            .insert((*metric).to_string(), MetricValue::Number(*value));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::timestamp;

    #[test]
    fn fixtures_produce_mergeable_records() {
        let session = session("a", "2024-01-01T10:00:00Z");
        assert!(session.has_sync_id());
        assert!(timestamp::is_lww_comparable(&session.completed_at));

        assert!(custom_workout("w1", "X").has_sync_id());

        let records = records(&[("pushups", "reps", 10.0)]);
        assert_eq!(
            records["pushups"]["reps"],
            MetricValue::Number(10.0)
        );
    }
}
