//! End-to-end tests: client, store, and the in-process reference remote.

use cadence_core::MetricValue;
use cadence_store::{LocalStore, MemoryBackend};
use cadence_sync_engine::{
    MemoryRemote, SessionGate, StaticGate, SyncClient, SyncClientConfig, SyncError, SyncState,
    ToggleGate,
};
use cadence_testkit::fixtures::{profile, session, snapshot_with_history};
use std::sync::Arc;
use std::time::Duration;

fn client<G: SessionGate + 'static>(
    remote: &Arc<MemoryRemote>,
    gate: Arc<G>,
) -> SyncClient<MemoryBackend, MemoryRemote, G> {
    SyncClient::new(
        Arc::new(LocalStore::new(MemoryBackend::new())),
        Arc::clone(remote),
        gate,
        SyncClientConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn unauthenticated_mutations_produce_zero_network_calls() {
    let remote = Arc::new(MemoryRemote::new());
    let client = client(&remote, Arc::new(StaticGate::anonymous()));
    let _listener = client.attach();

    for i in 0..5 {
        client.store().update(|s| s.user.xp = i).unwrap();
    }
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(remote.push_calls(), 0);
    assert_eq!(remote.pull_calls(), 0);
    assert_eq!(client.store().cursor(), None);

    let err = client.pull_and_merge().await.unwrap_err();
    assert!(matches!(err, SyncError::NotAuthenticated));
    assert_eq!(remote.pull_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn a_burst_of_saves_collapses_into_one_push() {
    let remote = Arc::new(MemoryRemote::new());
    let client = client(&remote, Arc::new(StaticGate::authenticated()));
    let _listener = client.attach();

    for i in 0..5 {
        client
            .store()
            .record_session(session(&format!("s{i}"), "2024-01-01T10:00:00Z"))
            .unwrap();
    }
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(remote.push_calls(), 1);
    assert_eq!(remote.snapshot().history.len(), 5);
    assert_eq!(client.status().pushes_completed, 1);
    assert!(client.store().cursor().is_some());
}

#[tokio::test(start_paused = true)]
async fn each_new_burst_gets_its_own_push() {
    let remote = Arc::new(MemoryRemote::new());
    let client = client(&remote, Arc::new(StaticGate::authenticated()));
    let _listener = client.attach();

    client.store().update(|s| s.user.xp = 1).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    client.store().update(|s| s.user.xp = 2).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(remote.push_calls(), 2);
    assert_eq!(remote.snapshot().user.xp, 2);
}

#[tokio::test(start_paused = true)]
async fn the_gate_is_consulted_fresh_on_every_trigger() {
    let remote = Arc::new(MemoryRemote::new());
    let gate = Arc::new(ToggleGate::new(false));
    let client = client(&remote, Arc::clone(&gate));
    let _listener = client.attach();

    client.store().update(|s| s.user.xp = 1).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(remote.push_calls(), 0);

    // Logging in flips the gate; the next mutation syncs with no
    // explicit enable call.
    gate.set(true);
    client.store().update(|s| s.user.xp = 2).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(remote.push_calls(), 1);

    gate.set(false);
    client.store().update(|s| s.user.xp = 3).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(remote.push_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn pull_write_back_does_not_schedule_a_push() {
    let mut server_state = snapshot_with_history(&[("r1", "2024-01-01T10:00:00Z")]);
    server_state.user = profile("Alice");
    server_state.updated_at = "2024-01-01T11:00:00Z".into();
    let remote = Arc::new(MemoryRemote::with_state(server_state));

    let client = client(&remote, Arc::new(StaticGate::authenticated()));
    let _listener = client.attach();

    client.pull_and_merge().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(remote.push_calls(), 0);
    assert_eq!(remote.pull_calls(), 1);

    let local = client.store().load();
    assert_eq!(local.user.name, "Alice");
    assert_eq!(local.history.len(), 1);
    assert_eq!(client.status().state, SyncState::Synced);
    assert_eq!(client.status().pulls_completed, 1);
}

#[tokio::test]
async fn two_clients_converge_through_one_remote() {
    let remote = Arc::new(MemoryRemote::new());
    let a = client(&remote, Arc::new(StaticGate::authenticated()));
    let b = client(&remote, Arc::new(StaticGate::authenticated()));

    // Device A sets up the profile and logs a session.
    a.store()
        .update(|s| {
            s.user.name = "Alice".into();
            s.user.xp = 100;
        })
        .unwrap();
    a.store()
        .record_session(session("a1", "2024-01-01T10:00:00Z"))
        .unwrap();
    a.push_now().await.unwrap();

    // Device B boots, pulls, then works offline-first.
    b.pull_and_merge().await.unwrap();
    b.store()
        .record_session(session("b1", "2024-01-02T10:00:00Z"))
        .unwrap();
    b.store()
        .record_personal_best("pushups", "reps", 15.0)
        .unwrap();
    b.push_now().await.unwrap();

    // Device A catches up with a full pull; the cursor-bounded
    // incremental path is covered separately below.
    a.store().clear_cursor().unwrap();
    a.pull_and_merge().await.unwrap();

    let snapshot_a = a.store().load();
    let snapshot_b = b.store().load();

    let ids_a: Vec<&str> = snapshot_a.history.iter().map(|s| s.id.as_str()).collect();
    let ids_b: Vec<&str> = snapshot_b.history.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids_a, vec!["b1", "a1"]);
    assert_eq!(ids_b, ids_a);

    assert_eq!(snapshot_a.user.name, "Alice");
    assert_eq!(snapshot_b.user.name, "Alice");
    assert_eq!(
        snapshot_a.personal_records["pushups"]["reps"],
        MetricValue::Number(15.0)
    );
    assert_eq!(snapshot_a.personal_records, snapshot_b.personal_records);
}

#[tokio::test]
async fn since_filtered_pull_still_converges() {
    // The client has already synced the old session; its cursor bounds
    // the next pull.
    let mut server_state = snapshot_with_history(&[
        ("new", "2024-01-03T10:00:00Z"),
        ("old", "2024-01-01T10:00:00Z"),
    ]);
    server_state.updated_at = "2024-01-03T11:00:00Z".into();
    let remote = Arc::new(MemoryRemote::with_state(server_state));

    let client = client(&remote, Arc::new(StaticGate::authenticated()));
    client
        .store()
        .save_merged(snapshot_with_history(&[("old", "2024-01-01T10:00:00Z")]))
        .unwrap();
    client.store().set_cursor("2024-01-02T00:00:00Z").unwrap();

    client.pull_and_merge().await.unwrap();

    // The server only sent the new session, but the union merge keeps
    // the full local history.
    let snapshot = client.store().load();
    let ids: Vec<&str> = snapshot
        .history
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["new", "old"]);
    assert_eq!(
        client.store().cursor().as_deref(),
        Some("2024-01-03T11:00:00Z")
    );
}

#[tokio::test]
async fn stale_pull_merges_on_top_of_newer_local_state() {
    let mut server_state = snapshot_with_history(&[("r1", "2024-01-01T10:00:00Z")]);
    server_state.user = profile("Old Name");
    server_state.updated_at = "2024-01-01T11:00:00Z".into();
    let remote = Arc::new(MemoryRemote::with_state(server_state));

    let client = client(&remote, Arc::new(StaticGate::authenticated()));
    // A local edit lands while the pull is conceptually in flight; its
    // save stamp is newer than the server's state.
    client
        .store()
        .update(|s| s.user.name = "New Name".into())
        .unwrap();

    client.pull_and_merge().await.unwrap();

    let local = client.store().load();
    assert_eq!(local.user.name, "New Name");
    assert_eq!(local.history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_pending_push_drops_the_scheduled_action() {
    let remote = Arc::new(MemoryRemote::new());
    let client = client(&remote, Arc::new(StaticGate::authenticated()));

    client.schedule_push();
    assert!(client.push_pending());
    client.cancel_pending_push();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(remote.push_calls(), 0);
    assert!(!client.push_pending());
}
