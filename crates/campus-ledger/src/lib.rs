//! Ledger access for campus records.
//!
//! The ledger is an ordered key-value state committed by an external ordering
//! service. This crate provides:
//! - [`LedgerKv`] -- the trait boundary for that state (`put_state`,
//!   `get_state`, `get_state_by_range`)
//! - [`InMemoryLedgerKv`] and [`FileLedgerKv`] implementations
//! - [`PointerLedger`] -- the adapter that stores one blob-store pointer per
//!   record key, as a `{"cid": ...}` envelope
//!
//! # Modules
//!
//! - [`error`] -- Error types for ledger operations
//! - [`traits`] -- [`LedgerKv`] and the [`StateIterator`] it returns
//! - [`memory`] -- In-memory [`InMemoryLedgerKv`]
//! - [`file`] -- JSON-file-backed [`FileLedgerKv`]
//! - [`pointer`] -- [`PointerLedger`] and [`PointerIter`]

pub mod error;
pub mod file;
pub mod memory;
pub mod pointer;
pub mod traits;

pub use error::{LedgerError, Result};
pub use file::FileLedgerKv;
pub use memory::InMemoryLedgerKv;
pub use pointer::{PointerEnvelope, PointerIter, PointerLedger};
pub use traits::{KeyValue, LedgerKv, StateIterator};
