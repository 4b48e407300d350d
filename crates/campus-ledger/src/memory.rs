//! In-memory ledger state for testing and ephemeral use.
//!
//! [`InMemoryLedgerKv`] keeps all state in a `BTreeMap` behind a `RwLock`, so
//! range scans come out in key order for free. Data is lost on drop.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{LedgerError, Result};
use crate::traits::{KeyValue, LedgerKv, StateIterator};

/// Copy the entries of `[start, end)` out of `state`, in key order.
pub(crate) fn scan(state: &BTreeMap<String, Vec<u8>>, start: &str, end: &str) -> Vec<KeyValue> {
    // BTreeMap::range panics on an inverted range.
    if !end.is_empty() && start >= end {
        return Vec::new();
    }
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    state
        .range::<str, _>((Bound::Included(start), upper))
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn poisoned<E: std::fmt::Display>(e: E) -> LedgerError {
    LedgerError::Transport {
        context: "in-memory ledger".into(),
        reason: format!("lock poisoned: {e}"),
    }
}

/// An in-memory implementation of [`LedgerKv`].
#[derive(Debug, Default)]
pub struct InMemoryLedgerKv {
    state: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryLedgerKv {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with committed state.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerKv for InMemoryLedgerKv {
    async fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.get(key).cloned())
    }

    async fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIterator> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(StateIterator::from_sorted(start, end, scan(&state, start, end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryLedgerKv {
        let kv = InMemoryLedgerKv::new();
        for key in ["1003", "1001", "1002", "2001"] {
            kv.put_state(key, key.as_bytes()).await.unwrap();
        }
        kv
    }

    fn keys(iter: StateIterator) -> Vec<String> {
        iter.map(|kv| kv.key).collect()
    }

    #[tokio::test]
    async fn put_then_get() {
        let kv = InMemoryLedgerKv::new();
        kv.put_state("1001", b"v1").await.unwrap();
        assert_eq!(kv.get_state("1001").await.unwrap(), Some(b"v1".to_vec()));
    }

    #[tokio::test]
    async fn get_unwritten_key_is_none() {
        let kv = InMemoryLedgerKv::new();
        assert_eq!(kv.get_state("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let kv = InMemoryLedgerKv::new();
        kv.put_state("1001", b"v1").await.unwrap();
        kv.put_state("1001", b"v2").await.unwrap();
        assert_eq!(kv.get_state("1001").await.unwrap(), Some(b"v2".to_vec()));
        assert_eq!(kv.len(), 1);
    }

    #[tokio::test]
    async fn full_scan_is_sorted() {
        let kv = seeded().await;
        let iter = kv.get_state_by_range("", "").await.unwrap();
        assert_eq!(keys(iter), vec!["1001", "1002", "1003", "2001"]);
    }

    #[tokio::test]
    async fn bounded_scan_is_half_open() {
        let kv = seeded().await;
        let iter = kv.get_state_by_range("1002", "2001").await.unwrap();
        assert_eq!(keys(iter), vec!["1002", "1003"]);
    }

    #[tokio::test]
    async fn open_ended_scan() {
        let kv = seeded().await;
        let iter = kv.get_state_by_range("1003", "").await.unwrap();
        assert_eq!(keys(iter), vec!["1003", "2001"]);
    }

    #[tokio::test]
    async fn inverted_or_empty_range_is_empty() {
        let kv = seeded().await;
        assert!(keys(kv.get_state_by_range("2", "1").await.unwrap()).is_empty());
        assert!(keys(kv.get_state_by_range("1001", "1001").await.unwrap()).is_empty());
        let empty = InMemoryLedgerKv::new();
        assert!(keys(empty.get_state_by_range("", "").await.unwrap()).is_empty());
    }

    #[tokio::test]
    async fn iterator_is_a_snapshot() {
        let kv = seeded().await;
        let iter = kv.get_state_by_range("", "").await.unwrap();
        kv.put_state("0000", b"late").await.unwrap();
        assert_eq!(iter.len(), 4);
        assert_eq!(keys(kv.get_state_by_range("", "").await.unwrap()).len(), 5);
    }
}
