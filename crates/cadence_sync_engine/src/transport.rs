//! Transport abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use cadence_core::{merge, Snapshot};
use cadence_sync_protocol::{MergedState, PullResponse, PushRequest, PushResponse};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Network communication with the sync server.
///
/// Abstracts the wire so the client can run over HTTP in the app, an
/// in-process remote in integration tests, or a scripted mock in unit
/// tests.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Sends the client snapshot to the server for merging.
    async fn push(&self, request: &PushRequest) -> SyncResult<PushResponse>;

    /// Fetches the server snapshot. `since` may bound the returned
    /// history; it is an optimization only, and a server is free to
    /// ignore it and return full history.
    async fn pull(&self, since: Option<&str>) -> SyncResult<PullResponse>;
}

/// A scripted transport for unit tests.
///
/// Responses are queued per operation and consumed in order; an
/// unscripted call fails with a protocol error.
#[derive(Debug, Default)]
pub struct MockTransport {
    push_results: Mutex<VecDeque<SyncResult<PushResponse>>>,
    pull_results: Mutex<VecDeque<SyncResult<PullResponse>>>,
    push_calls: AtomicUsize,
    pull_calls: AtomicUsize,
    last_push: Mutex<Option<PushRequest>>,
    last_since: Mutex<Option<Option<String>>>,
}

impl MockTransport {
    /// Creates a mock with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next unconsumed push.
    pub fn enqueue_push(&self, result: SyncResult<PushResponse>) {
        self.push_results.lock().push_back(result);
    }

    /// Queues the result of the next unconsumed pull.
    pub fn enqueue_pull(&self, result: SyncResult<PullResponse>) {
        self.pull_results.lock().push_back(result);
    }

    /// Number of push calls made so far.
    #[must_use]
    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// Number of pull calls made so far.
    #[must_use]
    pub fn pull_calls(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }

    /// The body of the most recent push, if any.
    #[must_use]
    pub fn last_push(&self) -> Option<PushRequest> {
        self.last_push.lock().clone()
    }

    /// The `since` argument of the most recent pull, if any.
    #[must_use]
    pub fn last_since(&self) -> Option<Option<String>> {
        self.last_since.lock().clone()
    }
}

#[async_trait]
impl SyncTransport for MockTransport {
    async fn push(&self, request: &PushRequest) -> SyncResult<PushResponse> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_push.lock() = Some(request.clone());
        self.push_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Protocol("no scripted push response".into())))
    }

    async fn pull(&self, since: Option<&str>) -> SyncResult<PullResponse> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_since.lock() = Some(since.map(str::to_string));
        self.pull_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Protocol("no scripted pull response".into())))
    }
}

/// An in-process reference server.
///
/// Holds a server-side snapshot and applies the identical
/// `cadence_core::merge` policy on push, with the incoming client data
/// playing the "local" role so the newest client write wins id
/// collisions, matching the production server. Push is idempotent by
/// construction: re-merging the same request converges to the same
/// state.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: RwLock<Snapshot>,
    push_calls: AtomicUsize,
    pull_calls: AtomicUsize,
}

impl MemoryRemote {
    /// Creates a remote with an empty (fresh-account) snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a remote seeded with existing server state.
    #[must_use]
    pub fn with_state(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    /// Returns a copy of the current server-side snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.state.read().clone()
    }

    /// Number of pushes handled.
    #[must_use]
    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// Number of pulls handled.
    #[must_use]
    pub fn pull_calls(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SyncTransport for MemoryRemote {
    async fn push(&self, request: &PushRequest) -> SyncResult<PushResponse> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        let incoming = request.to_snapshot();
        let mut state = self.state.write();
        let merged = merge(&incoming, &state);
        *state = merged.clone();
        Ok(PushResponse::acknowledged(MergedState::from_snapshot(
            &merged,
        )))
    }

    async fn pull(&self, since: Option<&str>) -> SyncResult<PullResponse> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.state.read().clone();
        let mut response = PullResponse::from_snapshot(&snapshot);
        // History filtering only; every other field is returned in full.
        if let Some(since) = since {
            response
                .history
                .retain(|session| session.completed_at.as_str() > since);
        }
        Ok(response)
    }
}
