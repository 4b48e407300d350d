//! Student record service.
//!
//! [`RecordService`] ties the pieces together:
//!
//! ```text
//! register(record)
//!   -> SnapshotAssembler::merge_and_serialize   whole key -> record mapping as JSON
//!   -> BlobStore::put                           content address of that snapshot
//!   -> PointerLedger::set_pointer               {"cid": ...} under the record key
//!
//! lookup(key)
//!   -> PointerLedger::get_pointer
//!   -> BlobStore::get(pointer, path = key)
//! ```
//!
//! Reads never consult the in-memory snapshot. A process that starts against
//! an existing ledger can serve lookups at once, but should call
//! [`RecordService::reseed`] before writing so its next snapshot still carries
//! records published by earlier processes.

pub mod config;
pub mod error;
pub mod seed;
pub mod service;
pub mod snapshot;
pub mod update;

pub use config::{BlobBackend, BlobConfig, CampusConfig, LedgerBackend, LedgerConfig};
pub use error::{RecordError, RecordResult};
pub use seed::demo_students;
pub use service::RecordService;
pub use snapshot::SnapshotAssembler;
pub use update::FieldUpdate;
