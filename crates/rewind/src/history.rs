#![forbid(unsafe_code)]

//! Snapshot history with a movable cursor.
//!
//! [`HistoryManager`] records encoded snapshots of a value, newest first, and
//! keeps a cursor on the snapshot currently being viewed. Undo and redo move
//! the cursor without touching stored snapshots. Pushing while the cursor is
//! not at the latest snapshot discards the snapshots newer than the cursor
//! (the redo branch) before recording.
//!
//! # Invariants
//!
//! 1. `cursor < snapshots.len()` whenever the cursor is set
//! 2. `snapshots.len() <= config.capacity` (after any operation)
//! 3. `cursor.is_none()` iff `snapshots` is empty
//! 4. Index 0 is the newest snapshot, `len - 1` the oldest
//! 5. `total_bytes` always equals the sum of `size_bytes()` over all snapshots
//!
//! # Index Model
//!
//! ```text
//! push(v1..v4), capacity 3
//! ┌──────────────────────────────────────────┐
//! │ index:     0     1     2                  │
//! │ snapshot: [v4,   v3,   v2]   (v1 evicted) │
//! │ cursor:    ^                              │
//! └──────────────────────────────────────────┘
//!
//! undo(2)
//! ┌──────────────────────────────────────────┐
//! │ snapshot: [v4,   v3,   v2]                │
//! │ cursor:                ^                  │
//! └──────────────────────────────────────────┘
//!
//! push(v5) <-- drops index < cursor, cursor back to 0
//! ┌──────────────────────────────────────────┐
//! │ snapshot: [v5,   v2]                      │
//! │ cursor:    ^                              │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Undo/Redo Asymmetry
//!
//! `undo` clamps at the oldest snapshot and returns `Ok(None)` on an empty
//! history. `redo` on an empty history is [`HistoryError::EmptyHistory`].

use std::any::type_name;
use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use web_time::SystemTime;

use crate::codec::{JsonCodec, SnapshotCodec};
use crate::config::HistoryConfig;
use crate::descriptor::HistoryDescriptor;
use crate::error::{HistoryError, HistoryResult};
use crate::snapshot::Snapshot;

/// Bounded, cursor-addressed snapshot history for values of type `T`.
pub struct HistoryManager<T, C = JsonCodec<T>> {
    /// Stored snapshots (newest at front).
    snapshots: VecDeque<Snapshot<T>>,
    /// Index of the viewed snapshot; `None` when empty.
    cursor: Option<usize>,
    /// Retention settings.
    config: HistoryConfig,
    /// Encoder/decoder for `T`.
    codec: C,
    /// Total bytes retained by all snapshots.
    total_bytes: usize,
}

impl<T, C> fmt::Debug for HistoryManager<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("len", &self.snapshots.len())
            .field("cursor", &self.cursor)
            .field("total_bytes", &self.total_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> HistoryManager<T, JsonCodec<T>>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a JSON-backed history with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(HistoryConfig::default(), JsonCodec::new())
    }

    /// Create a JSON-backed history with the given configuration.
    pub fn with_config(config: HistoryConfig) -> HistoryResult<Self> {
        Self::with_codec(config, JsonCodec::new())
    }
}

impl<T> Default for HistoryManager<T, JsonCodec<T>>
where
    T: Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> HistoryManager<T, C>
where
    C: SnapshotCodec<T>,
{
    /// Create a history with an explicit codec.
    ///
    /// Fails if the configuration is invalid or the codec refuses `T`.
    pub fn with_codec(config: HistoryConfig, codec: C) -> HistoryResult<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(HistoryError::InvalidConfig(errors));
        }
        if let Err(reason) = codec.check_supported() {
            tracing::warn!(
                type_name = type_name::<T>(),
                reason = %reason,
                "history codec refused value type"
            );
            return Err(HistoryError::UnsupportedType {
                type_name: type_name::<T>(),
                reason,
            });
        }
        Ok(Self::from_parts(config, codec))
    }

    fn from_parts(config: HistoryConfig, codec: C) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: None,
            config,
            codec,
            total_bytes: 0,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Record a snapshot of `value`.
    ///
    /// Snapshots newer than the cursor are discarded first and the cursor
    /// returns to the latest snapshot. Returns `Ok(false)` without changing
    /// anything if the codec rejects the encoded value.
    pub fn push(&mut self, value: &T, label: impl Into<String>) -> HistoryResult<bool> {
        let label = label.into();
        let Some(payload) = self.encode_accepted(value, &label, "push")? else {
            return Ok(false);
        };

        let discarded = self.discard_newer_than_cursor();
        self.insert_front(Snapshot::from_payload(payload, label));
        let evicted = self.enforce_capacity();

        tracing::debug!(
            label = self.current_label().unwrap_or_default(),
            cursor = ?self.cursor,
            len = self.snapshots.len(),
            discarded,
            evicted,
            "history push"
        );
        Ok(true)
    }

    /// Collapse up to `count` of the newest snapshots into one snapshot of
    /// `value`.
    ///
    /// Only allowed while the latest snapshot is current. Returns `Ok(false)`
    /// without removing anything if the codec rejects the encoded value.
    pub fn merge(
        &mut self,
        value: &T,
        label: impl Into<String>,
        count: usize,
    ) -> HistoryResult<bool> {
        if let Some(cursor) = self.cursor.filter(|&c| c > 0) {
            tracing::warn!(
                cursor,
                len = self.snapshots.len(),
                "history merge refused while viewing older snapshot"
            );
            return Err(HistoryError::InvalidOperationAtState { cursor });
        }

        let label = label.into();
        let Some(payload) = self.encode_accepted(value, &label, "merge")? else {
            return Ok(false);
        };

        let merged = count.min(self.snapshots.len());
        for snapshot in self.snapshots.drain(..merged) {
            self.total_bytes = self.total_bytes.saturating_sub(snapshot.size_bytes());
        }
        if self.snapshots.is_empty() {
            self.cursor = None;
        }
        self.insert_front(Snapshot::from_payload(payload, label));
        let evicted = self.enforce_capacity();

        tracing::debug!(
            label = self.current_label().unwrap_or_default(),
            merged,
            requested = count,
            len = self.snapshots.len(),
            evicted,
            "history merge"
        );
        Ok(true)
    }

    /// Move the cursor up to `steps` snapshots toward older history.
    ///
    /// Stops at the oldest snapshot. Returns the snapshot now under the
    /// cursor, or `Ok(None)` when the history is empty.
    pub fn undo(&mut self, steps: usize) -> HistoryResult<Option<T>> {
        let Some(start) = self.cursor else {
            tracing::debug!(steps, "history undo on empty history");
            return Ok(None);
        };

        let mut remaining = steps;
        while remaining > 0 && self.can_undo() {
            self.cursor = self.cursor.map(|c| c + 1);
            remaining -= 1;
        }

        tracing::debug!(
            from = start,
            to = ?self.cursor,
            requested = steps,
            moved = steps - remaining,
            "history undo"
        );
        self.current()
    }

    /// Move the cursor up to `steps` snapshots toward newer history.
    ///
    /// Returns the snapshot now under the cursor. Fails with
    /// [`HistoryError::EmptyHistory`] if nothing has been recorded.
    pub fn redo(&mut self, steps: usize) -> HistoryResult<T> {
        let Some(start) = self.cursor else {
            tracing::warn!(steps, len = 0usize, "history redo on empty history");
            return Err(HistoryError::EmptyHistory);
        };

        let mut remaining = steps;
        if start > 0 {
            while remaining > 0 && self.can_redo() {
                self.cursor = self.cursor.map(|c| c - 1);
                remaining -= 1;
            }
        }

        tracing::debug!(
            from = start,
            to = ?self.cursor,
            requested = steps,
            moved = steps - remaining,
            "history redo"
        );
        self.current()?.ok_or(HistoryError::EmptyHistory)
    }

    /// Drop all snapshots. A positive `new_capacity` replaces the capacity.
    pub fn clear(&mut self, new_capacity: Option<usize>) {
        if let Some(capacity) = new_capacity.filter(|&n| n > 0) {
            self.config.capacity = capacity;
        }
        let dropped = self.snapshots.len();
        self.snapshots.clear();
        self.cursor = None;
        self.total_bytes = 0;

        tracing::debug!(
            dropped,
            capacity = self.config.capacity,
            "history clear"
        );
    }

    /// Change the capacity and evict the oldest snapshots beyond it.
    ///
    /// A zero capacity is ignored, but the limit is re-enforced either way.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity > 0 {
            self.config.capacity = capacity;
        } else {
            tracing::warn!(
                requested = capacity,
                capacity = self.config.capacity,
                "history capacity must be positive; keeping current"
            );
        }
        let evicted = self.enforce_capacity();

        tracing::debug!(
            capacity = self.config.capacity,
            len = self.snapshots.len(),
            evicted,
            "history set capacity"
        );
    }

    /// Commit to the viewed snapshot: drop every snapshot newer than the
    /// cursor and make the viewed snapshot the latest.
    ///
    /// Returns the number of snapshots discarded.
    pub fn trim_future_on_current(&mut self) -> usize {
        let discarded = self.discard_newer_than_cursor();
        tracing::debug!(
            discarded,
            len = self.snapshots.len(),
            "history trim to current"
        );
        discarded
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// A fresh copy of the snapshot under the cursor, if any.
    pub fn current(&self) -> HistoryResult<Option<T>> {
        let Some(snapshot) = self.cursor.and_then(|c| self.snapshots.get(c)) else {
            return Ok(None);
        };
        Ok(Some(snapshot.materialize(&self.codec)?))
    }

    /// Check if an older snapshot exists beyond the cursor.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| self.snapshots.len() > c + 1)
    }

    /// Check if a newer snapshot exists before the cursor.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// One descriptor per stored snapshot, newest first.
    #[must_use]
    pub fn describe(&self) -> Vec<HistoryDescriptor> {
        let Some(cursor) = self.cursor else {
            return Vec::new();
        };
        self.snapshots
            .iter()
            .enumerate()
            .map(|(index, snapshot)| HistoryDescriptor::at(snapshot.label(), index, cursor))
            .collect()
    }

    /// Index of the viewed snapshot (0 = latest), `None` when empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Total bytes retained by all snapshots.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    /// Label of the snapshot under the cursor.
    #[must_use]
    pub fn current_label(&self) -> Option<&str> {
        self.cursor
            .and_then(|c| self.snapshots.get(c))
            .map(Snapshot::label)
    }

    /// Labels of all stored snapshots, newest first.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.snapshots.iter().map(Snapshot::label).collect()
    }

    /// Capture time of the snapshot at `index`.
    #[must_use]
    pub fn snapshot_time(&self, index: usize) -> Option<SystemTime> {
        self.snapshots.get(index).map(Snapshot::created_at)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Encode `value`, returning `None` if the codec rejects the payload.
    fn encode_accepted(
        &self,
        value: &T,
        label: &str,
        operation: &'static str,
    ) -> HistoryResult<Option<Vec<u8>>> {
        let payload = self.codec.encode(value).map_err(|e| {
            tracing::warn!(operation, label, error = %e, "history encode failed");
            HistoryError::Serialization(e)
        })?;
        if !self.codec.accepts(&payload) {
            tracing::warn!(operation, label, "history rejected empty value");
            return Ok(None);
        }
        tracing::trace!(operation, label, bytes = payload.len(), "history encoded");
        Ok(Some(payload))
    }

    /// Drop every snapshot at an index below the cursor and reset the cursor
    /// to 0. Returns the number dropped.
    fn discard_newer_than_cursor(&mut self) -> usize {
        let cursor = match self.cursor {
            Some(c) if c > 0 => c,
            _ => return 0,
        };
        for snapshot in self.snapshots.drain(..cursor) {
            self.total_bytes = self.total_bytes.saturating_sub(snapshot.size_bytes());
        }
        self.cursor = Some(0);
        cursor
    }

    fn insert_front(&mut self, snapshot: Snapshot<T>) {
        self.total_bytes += snapshot.size_bytes();
        self.snapshots.push_front(snapshot);
        self.cursor = Some(0);
    }

    /// Evict the oldest snapshots beyond capacity. Returns the number evicted.
    fn enforce_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.snapshots.len() > self.config.capacity {
            if let Some(snapshot) = self.snapshots.pop_back() {
                self.total_bytes = self.total_bytes.saturating_sub(snapshot.size_bytes());
                tracing::trace!(label = snapshot.label(), "history evicted oldest");
                evicted += 1;
            }
        }

        let len = self.snapshots.len();
        match self.cursor {
            Some(_) if len == 0 => self.cursor = None,
            Some(c) if c >= len => {
                tracing::warn!(
                    cursor = c,
                    len,
                    "history cursor evicted; clamped to oldest snapshot"
                );
                self.cursor = Some(len - 1);
            }
            _ => {}
        }
        evicted
    }
}

// ============================================================================
// Tests
// ============================================================================
