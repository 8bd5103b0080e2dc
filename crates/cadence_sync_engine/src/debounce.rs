//! A cancellable, reschedulable delayed task.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Collapses a burst of triggers into one deferred action.
///
/// Each [`Debouncer::schedule`] aborts any pending run and starts a
/// fresh quiet-period timer, so only the last action of a burst fires,
/// one quiet period after the burst ends. Modeled as a task rather than
/// a bare timer handle so tests can drive it with tokio's virtual
/// clock.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: Mutex::new(None),
        }
    }

    /// Returns the configured quiet period.
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// (Re)starts the quiet-period timer with a new action.
    ///
    /// Any previously scheduled action that has not fired yet is
    /// aborted. Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet_period = self.quiet_period;
        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            action.await;
        });
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Aborts any pending action.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Returns true if an action is scheduled and has not run yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
