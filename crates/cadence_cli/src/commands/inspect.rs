//! Inspect command implementation.

use cadence_store::{FileBackend, LocalStore};
use serde::Serialize;
use std::path::Path;

/// Snapshot inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory path.
    pub path: String,
    /// Display name on the profile.
    pub name: String,
    /// Lifetime experience points.
    pub xp: u64,
    /// Consecutive practice days.
    pub streak: u32,
    /// Completed sessions in history.
    pub history_sessions: usize,
    /// User-created workout templates.
    pub custom_workouts: usize,
    /// Exercises with at least one personal record.
    pub personal_record_exercises: usize,
    /// History sessions lacking a sync id.
    pub sessions_without_id: usize,
    /// When the snapshot was last saved.
    pub updated_at: String,
    /// Last-successful-sync cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_cursor: Option<String>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::new(FileBackend::open(path)?);
    let snapshot = store.load();

    let result = InspectResult {
        path: path.display().to_string(),
        name: snapshot.user.name.clone(),
        xp: snapshot.user.xp,
        streak: snapshot.user.streak,
        history_sessions: snapshot.history.len(),
        custom_workouts: snapshot.custom_workouts.len(),
        personal_record_exercises: snapshot.personal_records.len(),
        sessions_without_id: snapshot
            .history
            .iter()
            .filter(|session| !session.has_sync_id())
            .count(),
        updated_at: snapshot.updated_at.clone(),
        sync_cursor: store.cursor(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => print_text(&result),
        other => return Err(format!("unknown format: {other}").into()),
    }

    Ok(())
}

fn print_text(result: &InspectResult) {
    println!("Data directory: {}", result.path);
    println!();
    if result.name.is_empty() {
        println!("Profile:        <unnamed>");
    } else {
        println!("Profile:        {}", result.name);
    }
    println!("XP:             {}", result.xp);
    println!("Streak:         {} days", result.streak);
    println!();
    println!("History:        {} sessions", result.history_sessions);
    if result.sessions_without_id > 0 {
        println!(
            "                {} without a sync id (excluded from merges)",
            result.sessions_without_id
        );
    }
    println!("Custom workouts: {}", result.custom_workouts);
    println!(
        "Personal records: {} exercises",
        result.personal_record_exercises
    );
    println!();
    if result.updated_at.is_empty() {
        println!("Last saved:     never");
    } else {
        println!("Last saved:     {}", result.updated_at);
    }
    match &result.sync_cursor {
        Some(cursor) => println!("Last synced:    {cursor}"),
        None => println!("Last synced:    never"),
    }
}
