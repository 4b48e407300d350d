//! The pointer index: one blob-store pointer per record key.
//!
//! The ledger never holds record payloads. Under each record key it holds a
//! small envelope naming the content hash of the snapshot that carries the
//! record:
//!
//! ```text
//! "1816123" => {"cid":"bafy..."}
//! ```

use std::sync::Arc;

use campus_types::{validate_record_key, Pointer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::traits::{KeyValue, LedgerKv, StateIterator};

/// The ledger value stored under a record key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEnvelope {
    pub cid: Pointer,
}

impl PointerEnvelope {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::MalformedEnvelope {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Adapter that stores and resolves pointers in a [`LedgerKv`].
///
/// Writes are last-write-wins with no read-modify-write; the ledger's own
/// commit ordering serializes competing writers.
#[derive(Clone)]
pub struct PointerLedger {
    kv: Arc<dyn LedgerKv>,
}

impl PointerLedger {
    pub fn new(kv: Arc<dyn LedgerKv>) -> Self {
        Self { kv }
    }

    /// Publish `pointer` as the current value for `key`.
    pub async fn set_pointer(&self, key: &str, pointer: &Pointer) -> Result<()> {
        validate_record_key(key)?;
        let envelope = PointerEnvelope {
            cid: pointer.clone(),
        };
        self.kv.put_state(key, &envelope.encode()?).await?;
        debug!(key, pointer = %pointer, "pointer published");
        Ok(())
    }

    /// Resolve the current pointer for `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    pub async fn get_pointer(&self, key: &str) -> Result<Option<Pointer>> {
        validate_record_key(key)?;
        match self.kv.get_state(key).await? {
            None => Ok(None),
            Some(bytes) if bytes.is_empty() => Ok(None),
            Some(bytes) => Ok(Some(PointerEnvelope::decode(key, &bytes)?.cid)),
        }
    }

    /// Iterate `(key, pointer)` pairs over `[start, end)` in key order.
    ///
    /// Empty `start` and `end` scan every key. The returned iterator is
    /// one-shot; call again for a fresh scan.
    pub async fn list_keys(&self, start: &str, end: &str) -> Result<PointerIter> {
        let inner = self.kv.get_state_by_range(start, end).await?;
        Ok(PointerIter { inner })
    }
}

impl std::fmt::Debug for PointerLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerLedger").finish_non_exhaustive()
    }
}

/// Lazily decodes pointer envelopes out of a [`StateIterator`].
///
/// Each item is decoded on demand; a malformed envelope surfaces as an
/// `Err` item at its position in the scan.
pub struct PointerIter {
    inner: StateIterator,
}

impl Iterator for PointerIter {
    type Item = Result<(String, Pointer)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .find(|kv| !kv.value.is_empty())
            .map(|KeyValue { key, value }| {
                let envelope = PointerEnvelope::decode(&key, &value)?;
                Ok((key, envelope.cid))
            })
    }
}
