//! The [`LedgerKv`] trait defining the ledger state interface.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// One committed key and its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One-shot iterator over a key range of ledger state.
///
/// Entries come out in ascending key order. The iterator owns a point-in-time
/// copy of the range, so it holds no lock on the ledger. Dropping it releases
/// it, whether or not it was exhausted.
pub struct StateIterator {
    entries: std::vec::IntoIter<KeyValue>,
    start: String,
    end: String,
    yielded: usize,
}

impl StateIterator {
    /// Build an iterator over entries already sorted by key.
    pub fn from_sorted(start: &str, end: &str, entries: Vec<KeyValue>) -> Self {
        Self {
            entries: entries.into_iter(),
            start: start.to_string(),
            end: end.to_string(),
            yielded: 0,
        }
    }

    /// Whether more entries remain.
    pub fn has_next(&self) -> bool {
        !self.entries.as_slice().is_empty()
    }
}

impl Iterator for StateIterator {
    type Item = KeyValue;

    fn next(&mut self) -> Option<KeyValue> {
        let next = self.entries.next();
        if next.is_some() {
            self.yielded += 1;
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for StateIterator {}

impl Drop for StateIterator {
    fn drop(&mut self) {
        debug!(
            start = %self.start,
            end = %self.end,
            yielded = self.yielded,
            remaining = self.entries.len(),
            "state iterator released"
        );
    }
}

/// Ledger key-value state.
///
/// Implementations must be thread-safe (`Send + Sync`). A committed
/// `put_state` is visible to every later `get_state` and range scan. Writes to
/// the same key are last-write-wins; ordering between concurrent writers is
/// the ledger's ordering service's business, not this trait's.
#[async_trait]
pub trait LedgerKv: Send + Sync {
    /// Commit `value` under `key`.
    async fn put_state(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Read the value under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Iterate `[start, end)` in key order.
    ///
    /// An empty `start` scans from the first key and an empty `end` has no
    /// upper bound. An inverted range is empty, not an error.
    async fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIterator>;
}
