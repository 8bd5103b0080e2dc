//! Backend trait for snapshot persistence.

use crate::error::StoreResult;

/// The documents a backend persists.
///
/// Backends are **opaque byte stores**: they do not interpret the
/// document contents. The store owns serialization and all fallback
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The full application snapshot.
    Snapshot,
    /// The last-successful-sync cursor.
    SyncCursor,
}

/// A whole-document persistence backend.
///
/// # Invariants
///
/// - `write` is all-or-nothing: a concurrent or subsequent `read` sees
///   either the previous document or the new one, never a mix
/// - `read` returns exactly the bytes of the last completed `write`, or
///   `None` if the slot has never been written (or was wiped)
/// - Backends must be `Send + Sync` for shared access
pub trait SnapshotBackend: Send + Sync {
    /// Reads the current contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs. A missing document is
    /// `Ok(None)`, not an error.
    fn read(&self, slot: Slot) -> StoreResult<Option<Vec<u8>>>;

    /// Atomically replaces the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be made durable. On
    /// error the previous contents remain intact.
    fn write(&self, slot: Slot, bytes: &[u8]) -> StoreResult<()>;

    /// Removes the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs. Wiping an empty slot is
    /// a no-op.
    fn wipe(&self, slot: Slot) -> StoreResult<()>;
}
