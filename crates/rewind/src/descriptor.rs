#![forbid(unsafe_code)]

//! Derived views of stored snapshots relative to the cursor.

/// Where a stored snapshot sits relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Stored index is below the cursor (negative delta).
    Past,
    /// The snapshot under the cursor.
    Current,
    /// Stored index is above the cursor (positive delta).
    Future,
}

/// Read-only projection of one stored snapshot.
///
/// `delta_from_current` is `stored_index - cursor`. Index 0 is the newest
/// snapshot, so a negative delta marks an entry newer than the one being
/// viewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDescriptor {
    label: String,
    delta_from_current: isize,
}

impl HistoryDescriptor {
    #[must_use]
    pub fn new(label: impl Into<String>, delta_from_current: isize) -> Self {
        Self {
            label: label.into(),
            delta_from_current,
        }
    }

    /// Build the descriptor for `index` given the manager's `cursor`.
    #[must_use]
    pub(crate) fn at(label: &str, index: usize, cursor: usize) -> Self {
        // Both values are bounded by the retained snapshot count.
        let delta = index as isize - cursor as isize;
        Self::new(label, delta)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn delta_from_current(&self) -> isize {
        self.delta_from_current
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.delta_from_current == 0
    }

    #[must_use]
    pub fn is_past(&self) -> bool {
        self.delta_from_current < 0
    }

    #[must_use]
    pub fn is_future(&self) -> bool {
        self.delta_from_current > 0
    }

    /// Absolute distance from the cursor.
    #[must_use]
    pub fn steps_from_current(&self) -> usize {
        self.delta_from_current.unsigned_abs()
    }

    #[must_use]
    pub fn position(&self) -> Position {
        match self.delta_from_current {
            0 => Position::Current,
            d if d < 0 => Position::Past,
            _ => Position::Future,
        }
    }
}
