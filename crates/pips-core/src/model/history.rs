//! Bounded, newest-first roll history.
//!
//! The ledger is a fixed-capacity ring buffer: new records go to the front
//! and the oldest record falls off the back once [`HISTORY_CAPACITY`] is
//! exceeded. It has no knowledge of rendering and is driven entirely by the
//! roll controller.

use super::face::Face;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of records retained.
pub const HISTORY_CAPACITY: usize = 20;

/// Identifier of a completed roll.
///
/// Derived from the completion time in epoch milliseconds plus a sequence
/// number assigned by the controller, so rolls completing within the same
/// millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RollId {
    pub millis: i64,
    pub seq: u64,
}

impl RollId {
    #[must_use]
    pub const fn new(millis: i64, seq: u64) -> Self {
        Self { millis, seq }
    }
}

impl fmt::Display for RollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.millis, self.seq)
    }
}

impl Serialize for RollId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RollId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let (millis, seq) = raw
            .split_once('-')
            .ok_or_else(|| serde::de::Error::custom(format!("malformed roll id '{raw}'")))?;
        let millis = millis.parse().map_err(serde::de::Error::custom)?;
        let seq = seq.parse().map_err(serde::de::Error::custom)?;
        Ok(Self { millis, seq })
    }
}

/// One completed roll. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    pub id: RollId,
    pub value: Face,
    pub timestamp: DateTime<Local>,
}

impl RollRecord {
    #[must_use]
    pub const fn new(id: RollId, value: Face, timestamp: DateTime<Local>) -> Self {
        Self {
            id,
            value,
            timestamp,
        }
    }

    /// Time of day as shown in the history list, e.g. `3:04:05 PM`.
    #[must_use]
    pub fn time_of_day(&self) -> String {
        self.timestamp.format("%-I:%M:%S %p").to_string()
    }
}

/// Newest-first roll history with a hard length cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLedger {
    entries: VecDeque<RollRecord>,
}

impl HistoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Prepend `record`, evicting the oldest entry past capacity.
    ///
    /// Returns the evicted record, if any.
    pub fn record(&mut self, record: RollRecord) -> Option<RollRecord> {
        self.entries.push_front(record);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&RollRecord> {
        self.entries.front()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RollRecord> {
        self.entries.get(index)
    }

    /// Records, newest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &RollRecord> + DoubleEndedIterator {
        self.entries.iter()
    }

    /// Face values, newest first.
    pub fn values(&self) -> impl ExactSizeIterator<Item = Face> + '_ {
        self.entries.iter().map(|r| r.value)
    }

    /// Display ordinal ("Roll #N") of the entry at `index`.
    ///
    /// The newest entry carries the highest number; the oldest retained
    /// entry is always #1.
    #[must_use]
    pub fn ordinal(&self, index: usize) -> Option<usize> {
        (index < self.entries.len()).then(|| self.entries.len() - index)
    }
}

impl<'a> IntoIterator for &'a HistoryLedger {
    type Item = &'a RollRecord;
    type IntoIter = std::collections::vec_deque::Iter<'a, RollRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
