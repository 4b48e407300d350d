//! Content-addressed blob storage for campus records.
//!
//! Objects are immutable and identified by a [`Pointer`](campus_types::Pointer)
//! derived from their bytes. Structured (JSON) objects can be read back
//! partially: a path such as `"1816123"` or `"1816123/subjects/0"` selects one
//! sub-object without the caller decoding the whole thing.
//!
//! # Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`KuboBlobStore`] -- IPFS Kubo node over its HTTP RPC API
//!
//! # Rules
//!
//! 1. Putting identical bytes twice yields the same pointer and one stored copy.
//! 2. A missing pointer or path segment is [`BlobError::NotFound`] /
//!    [`BlobError::PathNotFound`], never a transport error.
//! 3. Transport failures carry the endpoint and the pointer involved.

pub mod error;
pub mod kubo;
pub mod memory;
pub mod path;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use kubo::KuboBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{BlobStore, Encoding};
