//! The snapshot document and its record types.
//!
//! Field names on the wire and on disk are camelCase, matching the JSON
//! schema the app has always persisted. Every struct tolerates missing
//! fields (schema defaults) and preserves unknown fields where older or
//! newer app versions may have written them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::timestamp;

/// Best scores per exercise, per metric.
pub type PersonalRecords = BTreeMap<String, BTreeMap<String, MetricValue>>;

/// A single personal-record leaf.
///
/// Numeric leaves merge by maximum; anything else is carried opaquely.
/// A numeric zero is a present value, distinct from an absent leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// A numeric score (reps, seconds, words per minute, ...).
    Number(f64),
    /// Any non-numeric value, kept as-is.
    Other(Value),
}

impl MetricValue {
    /// Returns the numeric value, if this leaf is numeric.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Other(_) => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

/// The user's profile record.
///
/// Merged as a whole object by last-write-wins; fields are never merged
/// individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Lifetime experience points.
    pub xp: u64,
    /// Current level, derived from xp by the app layer.
    pub level: u32,
    /// Consecutive practice days.
    pub streak: u32,
    /// Date of the most recent practice session.
    pub last_practice_date: Option<String>,
    /// Target sessions per week.
    pub weekly_goal: u32,
    /// When the profile was created.
    pub created_at: String,
    /// Fields written by other app versions, preserved round-trip.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            xp: 0,
            level: 1,
            streak: 0,
            last_practice_date: None,
            weekly_goal: 3,
            created_at: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// App settings record.
///
/// Merged as a whole object by last-write-wins, same as the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Default rest between exercises, in seconds.
    pub rest_duration: u32,
    /// Whether sounds play during workouts.
    pub sound_enabled: bool,
    /// Whether practice reminders are enabled.
    pub notifications: bool,
    /// Fields written by other app versions, preserved round-trip.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_duration: 30,
            sound_enabled: true,
            notifications: false,
            extra: BTreeMap::new(),
        }
    }
}

/// Per-exercise results embedded in a completed session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseResult {
    /// Exercise id from the content catalog.
    pub exercise_id: String,
    /// Exercise display name at the time of the session.
    pub name: String,
    /// Sets completed for this exercise.
    pub sets_completed: u32,
    /// Self-ratings collected per set.
    pub ratings: Vec<u32>,
}

/// An immutable record of one completed workout session.
///
/// Sessions are append-only: the id is assigned at creation and never
/// reassigned, and a session is never mutated after it enters history.
/// A session without an id cannot participate in sync merges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkoutSession {
    /// Globally unique session id, assigned at creation.
    pub id: String,
    /// Workout template id.
    pub workout_id: String,
    /// Workout display name at the time of the session.
    pub workout_name: String,
    /// Workout icon.
    pub icon: String,
    /// Workout accent color.
    pub color: String,
    /// Per-exercise results.
    pub exercises: Vec<ExerciseResult>,
    /// Total active duration in seconds.
    pub total_duration: u64,
    /// Sets completed across all exercises.
    pub sets_completed: u32,
    /// Total sets in the workout.
    pub total_sets: u32,
    /// Experience points earned.
    pub xp_earned: u64,
    /// Streak day this session landed on.
    pub streak_day: u32,
    /// Completion time, zero-padded UTC ISO-8601.
    pub completed_at: String,
}

impl WorkoutSession {
    /// Creates a session completed now, with a freshly generated id.
    #[must_use]
    pub fn new(workout_id: impl Into<String>, workout_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workout_id: workout_id.into(),
            workout_name: workout_name.into(),
            completed_at: timestamp::now_utc(),
            ..Self::default()
        }
    }

    /// Returns true if this session can participate in id-union merges.
    #[must_use]
    pub fn has_sync_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// A user-created workout template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomWorkout {
    /// Globally unique workout id.
    pub id: String,
    /// Workout display name.
    pub name: String,
    /// Workout icon.
    pub icon: String,
    /// Workout accent color.
    pub color: String,
    /// Exercise entries, opaque to the sync core.
    pub exercises: Vec<Value>,
    /// When the workout was created.
    pub created_at: String,
}

impl CustomWorkout {
    /// Creates an empty workout template with a freshly generated id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: timestamp::now_utc(),
            ..Self::default()
        }
    }

    /// Returns true if this workout can participate in id-union merges.
    #[must_use]
    pub fn has_sync_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// The complete local application state at a point in time.
///
/// Created with schema defaults on first load, mutated by every local
/// write, persisted atomically on save, and wiped only by explicit user
/// reset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// The user's profile.
    pub user: UserProfile,
    /// App settings.
    pub settings: Settings,
    /// Completed sessions, newest first.
    pub history: Vec<WorkoutSession>,
    /// Best scores per exercise, per metric.
    pub personal_records: PersonalRecords,
    /// User-created workout templates.
    pub custom_workouts: Vec<CustomWorkout>,
    /// When this snapshot was last saved, zero-padded UTC ISO-8601.
    /// Empty until the first save.
    pub updated_at: String,
}
