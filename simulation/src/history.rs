//! Scrubbable record of per-tick snapshots.

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Ordered snapshots with a movable cursor.
///
/// Index 0 always holds the state before the first tick and the buffer is
/// never empty. Recording while the cursor sits behind the tail discards the
/// snapshots after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryBuffer<T> {
    entries: Vec<T>,
    cursor: usize,
}

/// Reasons a stored history cannot be restored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// No snapshots were stored.
    #[error("history holds no snapshots")]
    Empty,
    /// The cursor points past the stored snapshots.
    #[error("history cursor {cursor} is outside the {len} stored snapshots")]
    CursorOutOfRange {
        /// Stored cursor.
        cursor: usize,
        /// Number of stored snapshots.
        len: usize,
    },
}

impl<T> HistoryBuffer<T> {
    /// Creates a buffer holding only the initial snapshot.
    #[must_use]
    pub fn seeded(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Rebuilds a buffer from stored snapshots and cursor.
    pub fn restore(entries: Vec<T>, cursor: usize) -> Result<Self, HistoryError> {
        if entries.is_empty() {
            return Err(HistoryError::Empty);
        }
        if cursor >= entries.len() {
            return Err(HistoryError::CursorOutOfRange {
                cursor,
                len: entries.len(),
            });
        }
        Ok(Self { entries, cursor })
    }

    /// Drops every snapshot after the cursor, appends `entry` and moves the
    /// cursor onto it.
    pub fn record(&mut self, entry: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    /// Moves the cursor to `index`, clamped to the recorded range, and
    /// returns the snapshot found there.
    pub fn scrub_to(&mut self, index: usize) -> &T {
        self.cursor = index.min(self.entries.len() - 1);
        &self.entries[self.cursor]
    }

    /// Snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    /// Snapshot at `index`, if recorded.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Number of recorded snapshots, at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Position of the cursor.
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Iterates over every snapshot from the initial one onward.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter()
    }
}

impl<'de, T> Deserialize<'de> for HistoryBuffer<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename = "HistoryBuffer")]
        struct Stored<T> {
            entries: Vec<T>,
            cursor: usize,
        }

        let Stored { entries, cursor } = Stored::deserialize(deserializer)?;
        Self::restore(entries, cursor).map_err(de::Error::custom)
    }
}
