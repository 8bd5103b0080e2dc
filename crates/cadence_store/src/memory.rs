//! In-memory backend for testing.

use crate::backend::{Slot, SnapshotBackend};
use crate::error::StoreResult;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Slots {
    snapshot: Option<Vec<u8>>,
    cursor: Option<Vec<u8>>,
}

impl Slots {
    fn get(&self, slot: Slot) -> &Option<Vec<u8>> {
        match slot {
            Slot::Snapshot => &self.snapshot,
            Slot::SyncCursor => &self.cursor,
        }
    }

    fn get_mut(&mut self, slot: Slot) -> &mut Option<Vec<u8>> {
        match slot {
            Slot::Snapshot => &mut self.snapshot,
            Slot::SyncCursor => &mut self.cursor,
        }
    }
}

/// An in-memory backend.
///
/// Suitable for unit tests, integration tests, and ephemeral stores that
/// do not need persistence. Thread-safe and shareable.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: RwLock<Slots>,
}

impl MemoryBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with pre-existing snapshot bytes.
    ///
    /// Useful for testing load fallback on corrupt or legacy data.
    #[must_use]
    pub fn with_snapshot(bytes: impl Into<Vec<u8>>) -> Self {
        let backend = Self::new();
        backend.slots.write().snapshot = Some(bytes.into());
        backend
    }

    /// Returns a copy of the current snapshot bytes, if any.
    #[must_use]
    pub fn snapshot_bytes(&self) -> Option<Vec<u8>> {
        self.slots.read().snapshot.clone()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self, slot: Slot) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.slots.read().get(slot).clone())
    }

    fn write(&self, slot: Slot, bytes: &[u8]) -> StoreResult<()> {
        *self.slots.write().get_mut(slot) = Some(bytes.to_vec());
        Ok(())
    }

    fn wipe(&self, slot: Slot) -> StoreResult<()> {
        *self.slots.write().get_mut(slot) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_both_slots() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read(Slot::Snapshot).unwrap(), None);

        backend.write(Slot::Snapshot, b"{}").unwrap();
        backend
            .write(Slot::SyncCursor, b"2024-01-01T00:00:00Z")
            .unwrap();

        assert_eq!(
            backend.read(Slot::Snapshot).unwrap().as_deref(),
            Some(b"{}".as_ref())
        );
        assert_eq!(
            backend.read(Slot::SyncCursor).unwrap().as_deref(),
            Some(b"2024-01-01T00:00:00Z".as_ref())
        );
    }

    #[test]
    fn wipe_clears_only_the_given_slot() {
        let backend = MemoryBackend::new();
        backend.write(Slot::Snapshot, b"{}").unwrap();
        backend.write(Slot::SyncCursor, b"c").unwrap();

        backend.wipe(Slot::SyncCursor).unwrap();
        assert_eq!(backend.read(Slot::SyncCursor).unwrap(), None);
        assert!(backend.read(Slot::Snapshot).unwrap().is_some());
    }

    #[test]
    fn with_snapshot_preloads_data() {
        let backend = MemoryBackend::with_snapshot(b"not json".to_vec());
        assert_eq!(
            backend.read(Slot::Snapshot).unwrap().as_deref(),
            Some(b"not json".as_ref())
        );
    }
}
