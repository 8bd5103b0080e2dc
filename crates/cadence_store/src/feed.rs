//! Save events published by the local store.
//!
//! The sync layer subscribes to the feed instead of being hard-wired
//! into the store, so the store stays testable in isolation and the
//! merge write-back path can bypass the feed entirely.

use tokio::sync::broadcast;

/// Capacity of the event channel. A lagged subscriber only needs to know
/// that *some* save happened, so a small buffer is enough.
const FEED_CAPACITY: usize = 16;

/// A save event emitted by the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEvent {
    /// A local mutation was persisted. The sync layer should schedule a
    /// debounced push.
    Mutation,
    /// The store was wiped by an explicit user reset.
    Reset,
}

/// A broadcast feed of [`SaveEvent`]s.
///
/// Subscribers that fall behind receive a lag error rather than stalling
/// the store; since every event carries the same meaning ("the snapshot
/// changed"), a lagged subscriber can simply treat the lag itself as a
/// change signal.
#[derive(Debug)]
pub struct SaveFeed {
    tx: broadcast::Sender<SaveEvent>,
}

impl SaveFeed {
    /// Creates a new feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Subscribes to save events from this point onward.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publishes an event. Dropped silently when nobody is listening.
    pub(crate) fn emit(&self, event: SaveEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SaveFeed {
    fn default() -> Self {
        Self::new()
    }
}
