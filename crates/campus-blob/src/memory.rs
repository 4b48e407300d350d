use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use campus_types::Pointer;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::path;
use crate::traits::{BlobStore, Encoding};

/// A stored object: encoding tag + bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
struct StoredBlob {
    encoding: Encoding,
    data: Vec<u8>,
}

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Pointers are CIDv1 strings over a BLAKE3
/// digest of the bytes, with the codec taken from the [`Encoding`]. Cloned on
/// read/write.
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<Pointer, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|obj| obj.data.len() as u64)
            .sum()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, data: &[u8], encoding: Encoding) -> BlobResult<Pointer> {
        if encoding == Encoding::Json {
            serde_json::from_slice::<serde_json::Value>(data)
                .map_err(|e| BlobError::Encoding(format!("not a JSON document: {e}")))?;
        }
        let pointer = Pointer::from_blake3(encoding.codec(), data);
        let mut map = self.objects.write().expect("lock poisoned");
        // Same pointer always maps to the same bytes, so an existing entry is kept.
        map.entry(pointer.clone()).or_insert_with(|| StoredBlob {
            encoding,
            data: data.to_vec(),
        });
        debug!(pointer = %pointer, bytes = data.len(), "blob stored");
        Ok(pointer)
    }

    async fn get(&self, pointer: &Pointer, path: Option<&str>) -> BlobResult<Vec<u8>> {
        let stored = self
            .objects
            .read()
            .expect("lock poisoned")
            .get(pointer)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(pointer.clone()))?;

        match path.filter(|p| !path::segments(p).is_empty()) {
            None => Ok(stored.data),
            Some(_) if stored.encoding == Encoding::Raw => {
                Err(BlobError::NotNavigable(pointer.clone()))
            }
            Some(p) => path::select(pointer, &stored.data, p),
        }
    }

    async fn exists(&self, pointer: &Pointer) -> BlobResult<bool> {
        Ok(self
            .objects
            .read()
            .expect("lock poisoned")
            .contains_key(pointer))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("object_count", &self.len())
            .finish()
    }
}
