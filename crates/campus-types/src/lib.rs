//! Foundation types for the campus records ledger.
//!
//! Every other campus crate depends on `campus-types`.
//!
//! # Key Types
//!
//! - [`StudentRecord`] -- the per-student document stored off-ledger
//! - [`Pointer`] -- content hash (CIDv1) addressing a blob-store object
//! - [`ErrorKind`] -- the four failure classes shared by every component
//!
//! Record keys are plain strings checked by [`validate_record_key`].

pub mod error;
pub mod key;
pub mod kind;
pub mod pointer;
pub mod record;

pub use error::TypeError;
pub use key::validate_record_key;
pub use kind::ErrorKind;
pub use pointer::{Codec, Pointer};
pub use record::StudentRecord;
