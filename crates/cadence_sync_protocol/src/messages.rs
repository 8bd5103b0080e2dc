//! Request and response bodies for push and pull.

use cadence_core::{CustomWorkout, PersonalRecords, Settings, Snapshot, UserProfile, WorkoutSession};
use serde::{Deserialize, Serialize};

/// Body of `POST /sync/push`: the sync-relevant subset of the client
/// snapshot. Today that subset happens to be the full document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushRequest {
    /// The client's profile.
    pub profile: UserProfile,
    /// The client's settings.
    pub settings: Settings,
    /// Full workout history. Insertion is keyed by session id server-side,
    /// so resending unchanged history is a no-op.
    pub history: Vec<WorkoutSession>,
    /// Best scores per exercise, per metric.
    pub personal_records: PersonalRecords,
    /// User-created workout templates.
    pub custom_workouts: Vec<CustomWorkout>,
    /// When the client snapshot was last saved.
    pub updated_at: String,
}

impl PushRequest {
    /// Builds a push body from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            profile: snapshot.user.clone(),
            settings: snapshot.settings.clone(),
            history: snapshot.history.clone(),
            personal_records: snapshot.personal_records.clone(),
            custom_workouts: snapshot.custom_workouts.clone(),
            updated_at: snapshot.updated_at.clone(),
        }
    }

    /// Reassembles the pushed state as a snapshot, as a merge-policy
    /// server would see it.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            user: self.profile.clone(),
            settings: self.settings.clone(),
            history: self.history.clone(),
            personal_records: self.personal_records.clone(),
            custom_workouts: self.custom_workouts.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// The server's post-merge view of the collision-bearing fields, echoed
/// back in a [`PushResponse`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergedState {
    /// Merged profile.
    pub profile: UserProfile,
    /// Merged settings.
    pub settings: Settings,
    /// Merged personal records.
    pub personal_records: PersonalRecords,
    /// Merged custom workouts.
    pub custom_workouts: Vec<CustomWorkout>,
}

impl MergedState {
    /// Extracts the echoed fields from a server-side merged snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            profile: snapshot.user.clone(),
            settings: snapshot.settings.clone(),
            personal_records: snapshot.personal_records.clone(),
            custom_workouts: snapshot.custom_workouts.clone(),
        }
    }
}

/// Body of the `POST /sync/push` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushResponse {
    /// Whether the push was accepted and merged.
    pub ok: bool,
    /// The server's merged state, when the push was accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged: Option<MergedState>,
}

impl PushResponse {
    /// Builds an acknowledging response carrying the merged state.
    #[must_use]
    pub fn acknowledged(merged: MergedState) -> Self {
        Self {
            ok: true,
            merged: Some(merged),
        }
    }
}

/// Body of the `GET /sync/pull` response.
///
/// `since` filtering applies to history only; all other fields are
/// always returned in full.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PullResponse {
    /// Server-side profile.
    pub profile: UserProfile,
    /// Server-side settings.
    pub settings: Settings,
    /// Server-side personal records.
    pub personal_records: PersonalRecords,
    /// Server-side custom workouts.
    pub custom_workouts: Vec<CustomWorkout>,
    /// Server-side history, possibly filtered by `since`.
    pub history: Vec<WorkoutSession>,
    /// When the server state was last written. Absent for a fresh
    /// account that has never pushed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PullResponse {
    /// Builds a pull body from a server-side snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            profile: snapshot.user.clone(),
            settings: snapshot.settings.clone(),
            personal_records: snapshot.personal_records.clone(),
            custom_workouts: snapshot.custom_workouts.clone(),
            history: snapshot.history.clone(),
            updated_at: if snapshot.updated_at.is_empty() {
                None
            } else {
                Some(snapshot.updated_at.clone())
            },
        }
    }

    /// Converts the pulled state into a snapshot for merging. Absent
    /// fields become schema defaults so a fresh server account merges
    /// cleanly into existing local state.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            user: self.profile,
            settings: self.settings,
            history: self.history,
            personal_records: self.personal_records,
            custom_workouts: self.custom_workouts,
            updated_at: self.updated_at.unwrap_or_default(),
        }
    }
}
