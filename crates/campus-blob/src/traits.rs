use async_trait::async_trait;
use campus_types::{Codec, Pointer};

use crate::error::{BlobError, BlobResult};

/// How the bytes handed to [`BlobStore::put`] are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// A JSON document. Must parse; navigable by path once stored.
    Json,
    /// Opaque bytes.
    Raw,
}

impl Encoding {
    /// Codec carried by pointers to objects stored with this encoding.
    pub fn codec(&self) -> Codec {
        match self {
            Self::Json => Codec::DagJson,
            Self::Raw => Codec::Raw,
        }
    }
}

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; identical bytes yield the same pointer.
/// - `put` is idempotent and never duplicates storage.
/// - A pointer returned by `put` can be resolved by any client of the same store.
/// - Absence is reported as `NotFound`/`PathNotFound`, transport trouble as
///   `Transport`. The two are never conflated.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` and return its content address.
    async fn put(&self, data: &[u8], encoding: Encoding) -> BlobResult<Pointer>;

    /// Fetch the object at `pointer`.
    ///
    /// With `path` set, navigate into the stored mapping one `/`-separated
    /// segment at a time and return only the selected sub-object, encoded as
    /// JSON. An empty path is the same as no path.
    async fn get(&self, pointer: &Pointer, path: Option<&str>) -> BlobResult<Vec<u8>>;

    /// Check whether an object exists.
    ///
    /// Default implementation fetches the object. Backends may override.
    async fn exists(&self, pointer: &Pointer) -> BlobResult<bool> {
        match self.get(pointer, None).await {
            Ok(_) => Ok(true),
            Err(BlobError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
