//! The sync client: orchestration, debounce, and observable status.

use crate::debounce::Debouncer;
use crate::error::{SyncError, SyncResult};
use crate::session::SessionGate;
use crate::transport::SyncTransport;
use cadence_core::{merge_with_report, timestamp};
use cadence_store::{LocalStore, SaveEvent, SnapshotBackend};
use cadence_sync_protocol::PushRequest;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Configuration for the sync client.
#[derive(Debug, Clone)]
pub struct SyncClientConfig {
    /// Quiet period a burst of mutations must outlast before one push
    /// goes out.
    pub quiet_period: Duration,
}

impl SyncClientConfig {
    /// Creates the default configuration (2 second quiet period).
    #[must_use]
    pub fn new() -> Self {
        Self {
            quiet_period: Duration::from_secs(2),
        }
    }

    /// Sets the quiet period.
    #[must_use]
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }
}

impl Default for SyncClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What the client is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Nothing scheduled or in flight.
    #[default]
    Idle,
    /// A push is waiting out the quiet period.
    PushPending,
    /// A push is in flight.
    Pushing,
    /// A pull-and-merge is in flight.
    Pulling,
    /// The last operation completed successfully.
    Synced,
    /// The server rejected the session; sync is paused until the auth
    /// state changes.
    AuthPaused,
}

/// Observable sync outcomes.
///
/// This is the only surface through which sync results reach tests and
/// future UI; errors never propagate past the client boundary, so a
/// stale `last_synced_at` is the sole user-visible symptom of a sync
/// problem.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    /// Current activity.
    pub state: SyncState,
    /// When the last successful push or pull completed.
    pub last_synced_at: Option<String>,
    /// Message of the most recent push failure, cleared on success.
    pub last_push_error: Option<String>,
    /// Message of the most recent pull failure, cleared on success.
    pub last_pull_error: Option<String>,
    /// Successful pushes since the client was created.
    pub pushes_completed: u64,
    /// Successful pull-and-merges since the client was created.
    pub pulls_completed: u64,
    /// History sessions excluded from merges for lacking an id.
    pub sessions_dropped: u64,
}

struct ClientInner<B, T, G>
where
    B: SnapshotBackend,
    T: SyncTransport,
    G: SessionGate,
{
    store: Arc<LocalStore<B>>,
    transport: Arc<T>,
    gate: Arc<G>,
    debouncer: Debouncer,
    status: RwLock<SyncStatus>,
}

/// The sync client.
///
/// Decides *when* to talk to the remote endpoint; merge policy lives in
/// `cadence_core`. Cheap to clone; clones share the same debouncer and
/// status.
///
/// At most one push is pending per quiet period, but pushes are not
/// serialized against pulls: the merge engine's idempotence (and
/// commutativity on the union fields) makes overlapping operations
/// converge instead of conflicting.
pub struct SyncClient<B, T, G>
where
    B: SnapshotBackend + 'static,
    T: SyncTransport + 'static,
    G: SessionGate + 'static,
{
    inner: Arc<ClientInner<B, T, G>>,
}

impl<B, T, G> Clone for SyncClient<B, T, G>
where
    B: SnapshotBackend + 'static,
    T: SyncTransport + 'static,
    G: SessionGate + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, T, G> SyncClient<B, T, G>
where
    B: SnapshotBackend + 'static,
    T: SyncTransport + 'static,
    G: SessionGate + 'static,
{
    /// Creates a client over a store, transport, and session gate.
    pub fn new(
        store: Arc<LocalStore<B>>,
        transport: Arc<T>,
        gate: Arc<G>,
        config: SyncClientConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                store,
                transport,
                gate,
                debouncer: Debouncer::new(config.quiet_period),
                status: RwLock::new(SyncStatus::default()),
            }),
        }
    }

    /// Returns the store this client syncs.
    pub fn store(&self) -> &Arc<LocalStore<B>> {
        &self.inner.store
    }

    /// Returns a copy of the current status.
    pub fn status(&self) -> SyncStatus {
        self.inner.status.read().clone()
    }

    /// Returns true if a push is scheduled but has not fired.
    pub fn push_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Subscribes this client to the store's save feed, so every local
    /// mutation schedules a debounced push with no wiring in app code.
    ///
    /// Returns the listener task handle; aborting it detaches the
    /// client.
    pub fn attach(&self) -> JoinHandle<()> {
        let mut events = self.inner.store.subscribe();
        let client = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SaveEvent::Mutation) => client.schedule_push(),
                    Ok(SaveEvent::Reset) => {}
                    // Missed events still mean the snapshot changed.
                    Err(RecvError::Lagged(_)) => client.schedule_push(),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Schedules a debounced push.
    ///
    /// The session gate is consulted fresh on every call; while
    /// unauthenticated this is a silent no-op, so any number of local
    /// mutations produce zero network traffic. Each call restarts the
    /// quiet-period timer, collapsing bursts into a single push.
    pub fn schedule_push(&self) {
        if !self.inner.gate.is_authenticated() {
            debug!("not authenticated; skipping push scheduling");
            return;
        }
        self.with_status(|status| status.state = SyncState::PushPending);
        let client = self.clone();
        self.inner.debouncer.schedule(async move {
            // Outcome lands in status; the fire-and-forget path has
            // nobody to hand an error to.
            let _ = client.push_now().await;
        });
    }

    /// Pushes the current snapshot immediately.
    ///
    /// On success the sync cursor advances to the pushed snapshot's
    /// `updatedAt`; on failure the cursor is untouched, so the same or
    /// newer data goes out on the next trigger. The server's merged echo
    /// is deliberately not applied locally; reconciliation is
    /// [`SyncClient::pull_and_merge`]'s job.
    ///
    /// # Errors
    ///
    /// Returns the failure for callers that want it (tests, CLI); the
    /// same outcome is always recorded in [`SyncStatus`].
    pub async fn push_now(&self) -> SyncResult<()> {
        if !self.inner.gate.is_authenticated() {
            debug!("not authenticated; skipping push");
            self.with_status(|status| status.state = SyncState::Idle);
            return Err(SyncError::NotAuthenticated);
        }

        self.with_status(|status| status.state = SyncState::Pushing);
        let snapshot = self.inner.store.load();
        let request = PushRequest::from_snapshot(&snapshot);

        let outcome = match self.inner.transport.push(&request).await {
            Ok(response) if response.ok => Ok(()),
            Ok(_) => Err(SyncError::Protocol("push was not acknowledged".into())),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(()) => {
                if !snapshot.updated_at.is_empty() {
                    if let Err(error) = self.inner.store.set_cursor(&snapshot.updated_at) {
                        let error = SyncError::from(error);
                        warn!(%error, "push succeeded but cursor could not be advanced");
                        self.with_status(|status| {
                            status.state = SyncState::Idle;
                            status.last_push_error = Some(error.to_string());
                        });
                        return Err(error);
                    }
                }
                self.with_status(|status| {
                    status.state = SyncState::Synced;
                    status.pushes_completed += 1;
                    status.last_push_error = None;
                    status.last_synced_at = Some(timestamp::now_utc());
                });
                info!(
                    sessions = snapshot.history.len(),
                    updated_at = %snapshot.updated_at,
                    "push completed"
                );
                Ok(())
            }
            Err(error) => {
                warn!(%error, "push failed; will retry on next trigger");
                self.with_status(|status| {
                    status.state = if error.is_auth() {
                        SyncState::AuthPaused
                    } else {
                        SyncState::Idle
                    };
                    status.last_push_error = Some(error.to_string());
                });
                Err(error)
            }
        }
    }

    /// Pulls the remote snapshot, merges it into local state, and writes
    /// the result back without triggering a push cycle.
    ///
    /// The current cursor is sent as `since` purely as an optimization;
    /// correctness holds even if the server ignores it and returns full
    /// history, because the merge unions by id. The pulled state is
    /// merged on top of whatever local state exists when the response
    /// resolves, never substituted for it.
    ///
    /// # Errors
    ///
    /// Returns the failure for callers that want it; local state is
    /// never corrupted or partially applied.
    pub async fn pull_and_merge(&self) -> SyncResult<()> {
        if !self.inner.gate.is_authenticated() {
            debug!("not authenticated; skipping pull");
            self.with_status(|status| status.state = SyncState::Idle);
            return Err(SyncError::NotAuthenticated);
        }

        self.with_status(|status| status.state = SyncState::Pulling);
        let since = self.inner.store.cursor();

        let response = match self.inner.transport.pull(since.as_deref()).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "pull failed; will retry on next trigger");
                self.with_status(|status| {
                    status.state = if error.is_auth() {
                        SyncState::AuthPaused
                    } else {
                        SyncState::Idle
                    };
                    status.last_pull_error = Some(error.to_string());
                });
                return Err(error);
            }
        };

        let remote = response.into_snapshot();
        let mut dropped = 0;
        let merged = self
            .inner
            .store
            .update_merged(|local| {
                let (merged, report) = merge_with_report(local, &remote);
                dropped = report.sessions_dropped;
                merged
            })
            .map_err(|error| {
                let error = SyncError::from(error);
                self.with_status(|status| {
                    status.state = SyncState::Idle;
                    status.last_pull_error = Some(error.to_string());
                });
                error
            })?;

        if timestamp::is_lww_comparable(&merged.updated_at) {
            if let Err(error) = self.inner.store.set_cursor(&merged.updated_at) {
                let error = SyncError::from(error);
                warn!(%error, "pull merged but cursor could not be advanced");
                self.with_status(|status| {
                    status.state = SyncState::Idle;
                    status.last_pull_error = Some(error.to_string());
                });
                return Err(error);
            }
        }
        self.with_status(|status| {
            status.state = SyncState::Synced;
            status.pulls_completed += 1;
            status.last_pull_error = None;
            status.last_synced_at = Some(timestamp::now_utc());
            status.sessions_dropped += dropped as u64;
        });
        info!(
            sessions = merged.history.len(),
            since = since.as_deref().unwrap_or("<unset>"),
            "pull-and-merge completed"
        );
        Ok(())
    }

    /// Cancels any pending push without touching in-flight operations.
    pub fn cancel_pending_push(&self) {
        self.inner.debouncer.cancel();
    }

    fn with_status(&self, apply: impl FnOnce(&mut SyncStatus)) {
        apply(&mut self.inner.status.write());
    }
}
