//! The local store: canonical snapshot ownership, cache, and save feed.

use crate::backend::{Slot, SnapshotBackend};
use crate::error::StoreResult;
use crate::feed::{SaveEvent, SaveFeed};
use cadence_core::{timestamp, MetricValue, Snapshot, WorkoutSession};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Owner of the canonical on-device snapshot.
///
/// The store holds the backend, an in-memory cache of the last
/// loaded/saved snapshot, and a [`SaveFeed`] the sync layer subscribes
/// to. Every mutation is a read-modify-write of the whole snapshot under
/// the cache lock, so overlapping operations cannot lose updates.
///
/// Two save paths exist on purpose:
/// - [`LocalStore::save`] (and the mutators built on it) stamps
///   `updatedAt` and emits [`SaveEvent::Mutation`], which the sync layer
///   turns into a debounced push.
/// - [`LocalStore::save_merged`] / [`LocalStore::update_merged`] persist
///   without stamping and without an event, so applying a pulled-and-merged
///   snapshot never queues an outbound push.
#[derive(Debug)]
pub struct LocalStore<B: SnapshotBackend> {
    backend: B,
    cache: RwLock<Option<Snapshot>>,
    feed: SaveFeed,
}

impl<B: SnapshotBackend> LocalStore<B> {
    /// Creates a store over the given backend. Nothing is read until the
    /// first [`LocalStore::load`].
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: RwLock::new(None),
            feed: SaveFeed::new(),
        }
    }

    /// Returns the save feed.
    pub fn feed(&self) -> &SaveFeed {
        &self.feed
    }

    /// Subscribes to save events.
    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.feed.subscribe()
    }

    /// Returns the current snapshot.
    ///
    /// Serves from the in-memory cache when present; otherwise reads the
    /// backend and deserializes. Missing, unreadable, or corrupt persisted
    /// data falls back to schema defaults; loading never fails.
    pub fn load(&self) -> Snapshot {
        if let Some(snapshot) = self.cache.read().as_ref() {
            return snapshot.clone();
        }

        let mut cache = self.cache.write();
        // Another caller may have filled the cache while we waited.
        if let Some(snapshot) = cache.as_ref() {
            return snapshot.clone();
        }
        let snapshot = self.read_persisted();
        *cache = Some(snapshot.clone());
        snapshot
    }

    /// Persists a locally mutated snapshot.
    ///
    /// Stamps `updatedAt`, writes atomically, replaces the cache, and
    /// emits [`SaveEvent::Mutation`] so the sync layer schedules a push.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails; the
    /// previously persisted snapshot and the cache are left intact.
    pub fn save(&self, mut snapshot: Snapshot) -> StoreResult<Snapshot> {
        snapshot.updated_at = timestamp::now_utc();
        let mut cache = self.cache.write();
        self.commit(&mut cache, snapshot.clone())?;
        drop(cache);
        self.feed.emit(SaveEvent::Mutation);
        Ok(snapshot)
    }

    /// Persists a pulled-and-merged snapshot.
    ///
    /// Does not restamp `updatedAt` (the merge already carries the newest
    /// timestamp of both sides) and emits no save event, so a merge
    /// write-back never triggers a push cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_merged(&self, snapshot: Snapshot) -> StoreResult<Snapshot> {
        let mut cache = self.cache.write();
        self.commit(&mut cache, snapshot.clone())?;
        Ok(snapshot)
    }

    /// Applies a local mutation as a read-modify-write of the whole
    /// snapshot under the cache lock, then saves.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the cache keeps the previous
    /// snapshot in that case.
    pub fn update(&self, mutate: impl FnOnce(&mut Snapshot)) -> StoreResult<Snapshot> {
        let mut cache = self.cache.write();
        let mut snapshot = match cache.as_ref() {
            Some(snapshot) => snapshot.clone(),
            None => self.read_persisted(),
        };
        mutate(&mut snapshot);
        snapshot.updated_at = timestamp::now_utc();
        self.commit(&mut cache, snapshot.clone())?;
        drop(cache);
        self.feed.emit(SaveEvent::Mutation);
        Ok(snapshot)
    }

    /// Reconciles the current snapshot with remote state under the cache
    /// lock and writes the result back without a save event.
    ///
    /// `reconcile` receives whatever local state exists at resolution
    /// time, so a stale in-flight pull merges on top of newer local
    /// mutations instead of replacing them.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn update_merged(
        &self,
        reconcile: impl FnOnce(&Snapshot) -> Snapshot,
    ) -> StoreResult<Snapshot> {
        let mut cache = self.cache.write();
        let current = match cache.as_ref() {
            Some(snapshot) => snapshot.clone(),
            None => self.read_persisted(),
        };
        let merged = reconcile(&current);
        self.commit(&mut cache, merged.clone())?;
        Ok(merged)
    }

    /// Appends a completed session to the front of history.
    ///
    /// Sessions created through [`WorkoutSession::new`] already carry a
    /// stable id; legacy callers passing an id-less session still get it
    /// persisted, but it will be excluded from sync merges.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn record_session(&self, session: WorkoutSession) -> StoreResult<Snapshot> {
        if !session.has_sync_id() {
            warn!(
                workout = %session.workout_name,
                "recording a session without an id; it will not sync"
            );
        }
        self.update(|snapshot| snapshot.history.insert(0, session))
    }

    /// Inserts or replaces a custom workout by id.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn upsert_custom_workout(
        &self,
        workout: cadence_core::CustomWorkout,
    ) -> StoreResult<Snapshot> {
        self.update(|snapshot| {
            match snapshot
                .custom_workouts
                .iter_mut()
                .find(|existing| existing.id == workout.id)
            {
                Some(existing) => *existing = workout,
                None => snapshot.custom_workouts.push(workout),
            }
        })
    }

    /// Records a numeric personal best, only ever raising the stored
    /// value. A non-numeric leaf under the same metric is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn record_personal_best(
        &self,
        exercise: &str,
        metric: &str,
        value: f64,
    ) -> StoreResult<Snapshot> {
        self.update(|snapshot| {
            let metrics = snapshot
                .personal_records
                .entry(exercise.to_string())
                .or_insert_with(BTreeMap::new);
            match metrics.get(metric).map(MetricValue::as_number) {
                // Absent leaf, or numeric leaf being beaten.
                None => {
                    metrics.insert(metric.to_string(), MetricValue::Number(value));
                }
                Some(Some(current)) if current < value => {
                    metrics.insert(metric.to_string(), MetricValue::Number(value));
                }
                // Standing numeric record, or a non-numeric leaf: keep it.
                Some(_) => {}
            }
        })
    }

    /// Returns the last-successful-sync cursor, if one is set.
    pub fn cursor(&self) -> Option<String> {
        match self.backend.read(Slot::SyncCursor) {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .ok()
                .filter(|value| !value.is_empty()),
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "failed to read sync cursor; treating as unset");
                None
            }
        }
    }

    /// Advances the sync cursor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidCursor`] if the value is not a
    /// zero-padded UTC timestamp (anything else would silently break the
    /// lexical ordering incremental pulls rely on), or an I/O error if
    /// the cursor cannot be persisted.
    pub fn set_cursor(&self, value: &str) -> StoreResult<()> {
        timestamp::ensure_comparable(value)?;
        self.backend.write(Slot::SyncCursor, value.as_bytes())
    }

    /// Clears the sync cursor, forcing the next pull to fetch everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend wipe fails.
    pub fn clear_cursor(&self) -> StoreResult<()> {
        self.backend.wipe(Slot::SyncCursor)
    }

    /// Wipes cache, snapshot, and cursor. Explicit user reset only.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend wipe fails; the cache is cleared
    /// regardless.
    pub fn clear(&self) -> StoreResult<()> {
        let mut cache = self.cache.write();
        *cache = None;
        self.backend.wipe(Slot::Snapshot)?;
        self.backend.wipe(Slot::SyncCursor)?;
        drop(cache);
        self.feed.emit(SaveEvent::Reset);
        Ok(())
    }

    /// Serializes and writes through to the backend, then replaces the
    /// cache. Must be called with the cache write lock held.
    fn commit(&self, cache: &mut Option<Snapshot>, snapshot: Snapshot) -> StoreResult<()> {
        let bytes = serde_json::to_vec(&snapshot)?;
        self.backend.write(Slot::Snapshot, &bytes)?;
        *cache = Some(snapshot);
        Ok(())
    }

    /// Reads and deserializes the persisted snapshot, falling back to
    /// schema defaults on any failure.
    fn read_persisted(&self) -> Snapshot {
        let bytes = match self.backend.read(Slot::Snapshot) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("no persisted snapshot; starting from schema defaults");
                return Snapshot::default();
            }
            Err(error) => {
                warn!(%error, "failed to read persisted snapshot; using schema defaults");
                return Snapshot::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "persisted snapshot is malformed; using schema defaults");
                Snapshot::default()
            }
        }
    }
}
