//! The conflict-resolution merge engine.
//!
//! [`merge`] reconciles two snapshots into one, with no side effects
//! beyond data-quality warnings on the tracing layer. The server-side
//! collaborator applies the identical policy, so client and server
//! converge regardless of which direction data flows first.
//!
//! Field rules:
//!
//! | Field             | Rule                                             |
//! |-------------------|--------------------------------------------------|
//! | user, settings    | whole-object LWW on `updatedAt`; ties keep local |
//! | personalRecords   | numeric leaves take the max; presence, not truthiness |
//! | customWorkouts    | id union, local wins on collision                |
//! | history           | id union, no overwrite, re-sorted newest first   |

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::timestamp;
use crate::types::{CustomWorkout, MetricValue, PersonalRecords, Snapshot, WorkoutSession};

/// Counts of records excluded from a merge for data-quality reasons.
///
/// A record without a stable id cannot participate in an id-union merge;
/// it is dropped from the merged result rather than raising an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// History sessions dropped for lacking an id.
    pub sessions_dropped: usize,
    /// Custom workouts dropped for lacking an id.
    pub workouts_dropped: usize,
}

impl MergeReport {
    /// Returns true if no records were dropped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.sessions_dropped == 0 && self.workouts_dropped == 0
    }
}

/// Merges two snapshots into one.
///
/// Pure: neither input is modified, and the same inputs always produce
/// the same output. `merge(s, s)` returns a snapshot equal to `s` for any
/// snapshot whose history is sorted newest-first, which every snapshot
/// produced by the store or by this function is.
#[must_use]
pub fn merge(local: &Snapshot, remote: &Snapshot) -> Snapshot {
    merge_with_report(local, remote).0
}

/// Merges two snapshots and reports any records excluded along the way.
#[must_use]
pub fn merge_with_report(local: &Snapshot, remote: &Snapshot) -> (Snapshot, MergeReport) {
    let mut report = MergeReport::default();

    // Profile and settings travel together as whole objects. Field-by-field
    // mixing of two devices' edits would manufacture a state neither device
    // ever saw.
    let remote_wins = timestamp::lww_newer(&remote.updated_at, &local.updated_at);
    let (user, settings) = if remote_wins {
        (remote.user.clone(), remote.settings.clone())
    } else {
        (local.user.clone(), local.settings.clone())
    };

    let personal_records = merge_personal_records(&local.personal_records, &remote.personal_records);
    let custom_workouts =
        union_custom_workouts(&local.custom_workouts, &remote.custom_workouts, &mut report);
    let history = union_history(&local.history, &remote.history, &mut report);

    let updated_at = timestamp::later(&local.updated_at, &remote.updated_at).to_string();

    let merged = Snapshot {
        user,
        settings,
        history,
        personal_records,
        custom_workouts,
        updated_at,
    };
    (merged, report)
}

/// Merges personal records leaf by leaf.
///
/// Numeric leaves are monotone: the merged value is the max of whichever
/// sides have one. Presence is checked on the map entry, never on the
/// value, so a recorded zero beats an absent leaf. Non-numeric leaves keep
/// the already-present value, local winning when both sides have one.
fn merge_personal_records(local: &PersonalRecords, remote: &PersonalRecords) -> PersonalRecords {
    let mut merged = local.clone();
    for (exercise, remote_metrics) in remote {
        let metrics = merged.entry(exercise.clone()).or_insert_with(BTreeMap::new);
        for (metric, remote_value) in remote_metrics {
            match metrics.get_mut(metric) {
                None => {
                    metrics.insert(metric.clone(), remote_value.clone());
                }
                Some(local_value) => {
                    if let (Some(l), Some(r)) = (local_value.as_number(), remote_value.as_number())
                    {
                        *local_value = MetricValue::Number(l.max(r));
                    }
                    // Non-numeric (or mixed-type) conflict: local stays.
                }
            }
        }
    }
    merged
}

/// Unions custom workouts by id, local winning on collision.
///
/// Remote entries are inserted first and local entries overwrite in
/// place, so both sides' unique ids always survive and a collision keeps
/// the local edit. Entries without an id are dropped with a warning.
fn union_custom_workouts(
    local: &[CustomWorkout],
    remote: &[CustomWorkout],
    report: &mut MergeReport,
) -> Vec<CustomWorkout> {
    let mut merged: Vec<CustomWorkout> = Vec::with_capacity(local.len() + remote.len());
    let mut position: HashMap<String, usize> = HashMap::new();

    for workout in remote.iter().chain(local) {
        if !workout.has_sync_id() {
            warn!(name = %workout.name, "dropping custom workout without id from merge");
            report.workouts_dropped += 1;
            continue;
        }
        match position.get(&workout.id) {
            Some(&at) => merged[at] = workout.clone(),
            None => {
                position.insert(workout.id.clone(), merged.len());
                merged.push(workout.clone());
            }
        }
    }
    merged
}

/// Unions history sessions by id, with no overwrite and no mutation.
///
/// Every previously-unseen id from either side appears exactly once;
/// sessions are immutable, so the first copy seen is kept as-is. The
/// merged set is re-sorted by completion time descending, with the id as
/// a tie-break so the ordering is total. Sessions without an id are
/// dropped with a warning.
fn union_history(
    local: &[WorkoutSession],
    remote: &[WorkoutSession],
    report: &mut MergeReport,
) -> Vec<WorkoutSession> {
    let mut merged: Vec<WorkoutSession> = Vec::with_capacity(local.len() + remote.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for session in local.iter().chain(remote) {
        if !session.has_sync_id() {
            warn!(
                workout = %session.workout_name,
                completed_at = %session.completed_at,
                "dropping history session without id from merge"
            );
            report.sessions_dropped += 1;
            continue;
        }
        if seen.insert(session.id.as_str()) {
            merged.push(session.clone());
        }
    }

    merged.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Settings, UserProfile};

    fn session(id: &str, completed_at: &str) -> WorkoutSession {
        WorkoutSession {
            id: id.into(),
            workout_id: "w1".into(),
            workout_name: "Morning Routine".into(),
            completed_at: completed_at.into(),
            ..WorkoutSession::default()
        }
    }

    fn workout(id: &str, name: &str) -> CustomWorkout {
        CustomWorkout {
            id: id.into(),
            name: name.into(),
            ..CustomWorkout::default()
        }
    }

    fn snapshot_at(updated_at: &str) -> Snapshot {
        Snapshot {
            updated_at: updated_at.into(),
            ..Snapshot::default()
        }
    }

    fn records(entries: &[(&str, &str, f64)]) -> PersonalRecords {
        let mut map = PersonalRecords::new();
        for (exercise, metric, value) in entries {
            map.entry((*exercise).to_string())
                .or_insert_with(BTreeMap::new)
                .insert((*metric).to_string(), MetricValue::Number(*value));
        }
        map
    }

    #[test]
    fn newer_remote_profile_wins_wholesale() {
        let mut local = snapshot_at("2024-01-01T00:00:00Z");
        local.user = UserProfile {
            name: "Alice".into(),
            ..UserProfile::default()
        };

        let mut remote = snapshot_at("2024-01-02T00:00:00Z");
        remote.user = UserProfile {
            name: "Alicia".into(),
            ..UserProfile::default()
        };

        let merged = merge(&local, &remote);
        assert_eq!(merged.user.name, "Alicia");
        assert_eq!(merged.updated_at, "2024-01-02T00:00:00Z");
    }

    #[test]
    fn older_or_tied_remote_profile_keeps_local() {
        let mut local = snapshot_at("2024-01-02T00:00:00Z");
        local.user.name = "Alice".into();

        let mut older = snapshot_at("2024-01-01T00:00:00Z");
        older.user.name = "Alicia".into();
        assert_eq!(merge(&local, &older).user.name, "Alice");

        let mut tied = snapshot_at("2024-01-02T00:00:00Z");
        tied.user.name = "Alicia".into();
        assert_eq!(merge(&local, &tied).user.name, "Alice");
    }

    #[test]
    fn profile_and_settings_move_together() {
        let mut local = snapshot_at("2024-01-01T00:00:00Z");
        local.user.name = "Alice".into();
        local.settings.rest_duration = 45;

        let mut remote = snapshot_at("2024-01-02T00:00:00Z");
        remote.user.name = "Alicia".into();
        remote.settings = Settings::default();

        let merged = merge(&local, &remote);
        // Remote won, so the local settings edit is gone too.
        assert_eq!(merged.user.name, "Alicia");
        assert_eq!(merged.settings.rest_duration, 30);
    }

    #[test]
    fn malformed_remote_timestamp_never_wins() {
        let mut local = snapshot_at("2024-01-01T00:00:00Z");
        local.user.name = "Alice".into();

        // Lexically "9..." would beat "2024-..." if comparison were blind.
        let mut remote = snapshot_at("9999 not a timestamp");
        remote.user.name = "Mallory".into();

        assert_eq!(merge(&local, &remote).user.name, "Alice");
    }

    #[test]
    fn numeric_records_take_the_max() {
        let local = Snapshot {
            personal_records: records(&[("pushups", "reps", 10.0)]),
            ..Snapshot::default()
        };
        let remote = Snapshot {
            personal_records: records(&[("pushups", "reps", 15.0)]),
            ..Snapshot::default()
        };

        let merged = merge(&local, &remote);
        assert_eq!(
            merged.personal_records["pushups"]["reps"],
            MetricValue::Number(15.0)
        );
    }

    #[test]
    fn recorded_zero_beats_absent_leaf() {
        let local = Snapshot {
            personal_records: records(&[("plank", "failures", 0.0)]),
            ..Snapshot::default()
        };
        let remote = Snapshot::default();

        let merged = merge(&local, &remote);
        assert_eq!(
            merged.personal_records["plank"]["failures"],
            MetricValue::Number(0.0)
        );

        // And the same leaf arriving only from remote is taken as-is.
        let merged = merge(&remote, &local);
        assert_eq!(
            merged.personal_records["plank"]["failures"],
            MetricValue::Number(0.0)
        );
    }

    #[test]
    fn non_numeric_record_conflict_keeps_local() {
        let mut local = Snapshot::default();
        local
            .personal_records
            .entry("speech".into())
            .or_insert_with(BTreeMap::new)
            .insert(
                "grade".into(),
                MetricValue::Other(serde_json::json!("silver")),
            );

        let mut remote = Snapshot::default();
        remote
            .personal_records
            .entry("speech".into())
            .or_insert_with(BTreeMap::new)
            .insert(
                "grade".into(),
                MetricValue::Other(serde_json::json!("gold")),
            );

        let merged = merge(&local, &remote);
        assert_eq!(
            merged.personal_records["speech"]["grade"],
            MetricValue::Other(serde_json::json!("silver"))
        );
    }

    #[test]
    fn history_union_keeps_both_sides() {
        let local = Snapshot {
            history: vec![session("a", "2024-01-01T10:00:00Z")],
            ..Snapshot::default()
        };
        let remote = Snapshot {
            history: vec![session("b", "2024-01-02T10:00:00Z")],
            ..Snapshot::default()
        };

        let merged = merge(&local, &remote);
        let ids: Vec<&str> = merged.history.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]); // newest first
    }

    #[test]
    fn history_never_duplicates_an_id() {
        let shared = session("a", "2024-01-01T10:00:00Z");
        let local = Snapshot {
            history: vec![shared.clone(), session("c", "2024-01-03T10:00:00Z")],
            ..Snapshot::default()
        };
        let remote = Snapshot {
            history: vec![shared, session("b", "2024-01-02T10:00:00Z")],
            ..Snapshot::default()
        };

        let merged = merge(&local, &remote);
        assert_eq!(merged.history.len(), 3);
        let ids: Vec<&str> = merged.history.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn sessions_without_ids_are_dropped_not_fatal() {
        let local = Snapshot {
            history: vec![session("", "2024-01-01T10:00:00Z")],
            ..Snapshot::default()
        };
        let remote = Snapshot {
            history: vec![session("b", "2024-01-02T10:00:00Z")],
            ..Snapshot::default()
        };

        let (merged, report) = merge_with_report(&local, &remote);
        assert_eq!(merged.history.len(), 1);
        assert_eq!(merged.history[0].id, "b");
        assert_eq!(report.sessions_dropped, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn custom_workout_collision_keeps_local() {
        let local = Snapshot {
            custom_workouts: vec![workout("w1", "X")],
            ..Snapshot::default()
        };
        let remote = Snapshot {
            custom_workouts: vec![workout("w1", "Y"), workout("w2", "Z")],
            ..Snapshot::default()
        };

        let merged = merge(&local, &remote);
        assert_eq!(merged.custom_workouts.len(), 2);
        assert_eq!(merged.custom_workouts[0].id, "w1");
        assert_eq!(merged.custom_workouts[0].name, "X");
        assert_eq!(merged.custom_workouts[1].name, "Z");
    }

    #[test]
    fn merge_is_idempotent_on_a_settled_snapshot() {
        let snapshot = Snapshot {
            user: UserProfile {
                name: "Alice".into(),
                xp: 420,
                ..UserProfile::default()
            },
            history: vec![
                session("b", "2024-01-02T10:00:00Z"),
                session("a", "2024-01-01T10:00:00Z"),
            ],
            personal_records: records(&[("pushups", "reps", 10.0)]),
            custom_workouts: vec![workout("w1", "X")],
            updated_at: "2024-01-02T11:00:00Z".into(),
            ..Snapshot::default()
        };

        assert_eq!(merge(&snapshot, &snapshot), snapshot);
    }

    #[test]
    fn union_fields_commute_as_id_sets() {
        let a = Snapshot {
            history: vec![
                session("x", "2024-01-05T10:00:00Z"),
                session("y", "2024-01-01T10:00:00Z"),
            ],
            custom_workouts: vec![workout("w1", "X")],
            ..Snapshot::default()
        };
        let b = Snapshot {
            history: vec![session("z", "2024-01-03T10:00:00Z")],
            custom_workouts: vec![workout("w2", "Z")],
            ..Snapshot::default()
        };

        let ab = merge(&a, &b);
        let ba = merge(&b, &a);
        // History carries no collision fields, so the whole vectors agree.
        assert_eq!(ab.history, ba.history);

        let mut ab_ids: Vec<&str> = ab.custom_workouts.iter().map(|w| w.id.as_str()).collect();
        let mut ba_ids: Vec<&str> = ba.custom_workouts.iter().map(|w| w.id.as_str()).collect();
        ab_ids.sort_unstable();
        ba_ids.sort_unstable();
        assert_eq!(ab_ids, ba_ids);
    }
}
