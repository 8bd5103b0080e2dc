//! Sync, push, and pull command implementations.

use cadence_store::{FileBackend, LocalStore};
use cadence_sync_engine::{HttpTransport, StaticGate, SyncClient, SyncClientConfig};
use std::path::Path;
use std::sync::Arc;

/// Which direction(s) to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Push only.
    Push,
    /// Pull and merge only.
    Pull,
    /// Push, then pull and merge.
    Both,
}

/// Runs a one-shot sync against the given server.
///
/// The session cookie is expected to already be present in the cookie
/// store from the magic-link flow; if it is absent or expired the server
/// answers 401 and the command reports the sync as paused.
pub async fn run(
    path: &Path,
    server: &str,
    direction: Direction,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(LocalStore::new(FileBackend::open(path)?));
    let transport = Arc::new(HttpTransport::new(server)?);
    let gate = Arc::new(StaticGate::authenticated());
    let client = SyncClient::new(store, transport, gate, SyncClientConfig::default());

    if matches!(direction, Direction::Push | Direction::Both) {
        match client.push_now().await {
            Ok(()) => println!("push: ok"),
            Err(error) => println!("push: failed ({error})"),
        }
    }

    if matches!(direction, Direction::Pull | Direction::Both) {
        match client.pull_and_merge().await {
            Ok(()) => println!("pull: ok"),
            Err(error) => println!("pull: failed ({error})"),
        }
    }

    let status = client.status();
    let snapshot = client.store().load();
    println!();
    println!("state:           {:?}", status.state);
    println!("history:         {} sessions", snapshot.history.len());
    match client.store().cursor() {
        Some(cursor) => println!("sync cursor:     {cursor}"),
        None => println!("sync cursor:     unset"),
    }
    if let Some(error) = &status.last_push_error {
        println!("last push error: {error}");
    }
    if let Some(error) = &status.last_pull_error {
        println!("last pull error: {error}");
    }

    Ok(())
}
