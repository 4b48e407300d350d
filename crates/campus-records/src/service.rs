use std::sync::Arc;

use campus_blob::{BlobStore, Encoding, InMemoryBlobStore, KuboBlobStore};
use campus_ledger::{FileLedgerKv, InMemoryLedgerKv, LedgerError, LedgerKv, PointerLedger};
use campus_types::{validate_record_key, Pointer, StudentRecord};
use tracing::{debug, info, warn};

use crate::config::{BlobBackend, CampusConfig, LedgerBackend};
use crate::error::{RecordError, RecordResult};
use crate::seed::demo_students;
use crate::snapshot::SnapshotAssembler;
use crate::update::FieldUpdate;

/// Student record API over a blob store and a ledger.
///
/// Writes go snapshot → blob store → ledger. Reads go ledger → blob store and
/// never consult the in-memory snapshot, so a fresh service over an existing
/// ledger serves lookups right away.
pub struct RecordService {
    snapshot: Arc<SnapshotAssembler>,
    blobs: Arc<dyn BlobStore>,
    pointers: PointerLedger,
}

impl RecordService {
    pub fn new(
        snapshot: Arc<SnapshotAssembler>,
        blobs: Arc<dyn BlobStore>,
        ledger: Arc<dyn LedgerKv>,
    ) -> Self {
        Self {
            snapshot,
            blobs,
            pointers: PointerLedger::new(ledger),
        }
    }

    /// A service with an empty snapshot and in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(SnapshotAssembler::new()),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryLedgerKv::new()),
        )
    }

    /// Build the backends named by `config`. The snapshot starts empty.
    pub fn open(config: &CampusConfig) -> RecordResult<Self> {
        config.validate()?;
        let blobs: Arc<dyn BlobStore> = match config.blob.backend {
            BlobBackend::Memory => Arc::new(InMemoryBlobStore::new()),
            BlobBackend::Kubo => Arc::new(
                KuboBlobStore::with_timeouts(
                    config.blob.endpoint.clone(),
                    config.blob.connect_timeout(),
                    config.blob.request_timeout(),
                )
                .map_err(RecordError::blob("<config>"))?,
            ),
        };
        let ledger: Arc<dyn LedgerKv> = match config.ledger.backend {
            LedgerBackend::Memory => Arc::new(InMemoryLedgerKv::new()),
            LedgerBackend::File => Arc::new(
                FileLedgerKv::open(&config.ledger.path).map_err(RecordError::ledger("<config>"))?,
            ),
        };
        info!(
            blob = ?config.blob.backend,
            ledger = ?config.ledger.backend,
            "record service opened"
        );
        Ok(Self::new(Arc::new(SnapshotAssembler::new()), blobs, ledger))
    }

    pub fn snapshot(&self) -> &SnapshotAssembler {
        &self.snapshot
    }

    /// Store `record` and publish its pointer.
    ///
    /// The blob is written before the pointer is published. If either step
    /// fails the snapshot merge is reverted, so the record never reaches a
    /// later snapshot; a blob already written stays in the store, unreferenced.
    pub async fn register(&self, record: StudentRecord) -> RecordResult<Pointer> {
        record.validate()?;
        let key = record.registration_number.clone();

        let merged = self.snapshot.merge_and_serialize(&key, record)?;
        let snapshot_bytes = merged.bytes.len();
        match self.publish(&key, &merged.bytes).await {
            Ok(pointer) => {
                info!(
                    key = %key,
                    pointer = %pointer,
                    snapshot_records = self.snapshot.len(),
                    snapshot_bytes,
                    "record registered"
                );
                Ok(pointer)
            }
            Err(e) => {
                let reverted = self.snapshot.revert(merged);
                warn!(key = %key, reverted, error = %e, "register failed");
                Err(e)
            }
        }
    }

    async fn publish(&self, key: &str, bytes: &[u8]) -> RecordResult<Pointer> {
        let pointer = self
            .blobs
            .put(bytes, Encoding::Json)
            .await
            .map_err(RecordError::blob(key))?;
        self.pointers
            .set_pointer(key, &pointer)
            .await
            .map_err(RecordError::ledger(key))?;
        Ok(pointer)
    }

    /// The pointer currently published for `key`.
    pub async fn pointer_of(&self, key: &str) -> RecordResult<Pointer> {
        validate_record_key(key)?;
        self.pointers
            .get_pointer(key)
            .await
            .map_err(RecordError::ledger(key))?
            .ok_or_else(|| RecordError::NotFound {
                key: key.to_string(),
            })
    }

    /// Fetch the record registered under `key`.
    pub async fn lookup(&self, key: &str) -> RecordResult<StudentRecord> {
        let pointer = self.pointer_of(key).await?;
        self.fetch(key, &pointer).await
    }

    /// Resolve `key` inside the snapshot at `pointer`.
    async fn fetch(&self, key: &str, pointer: &Pointer) -> RecordResult<StudentRecord> {
        let bytes = self
            .blobs
            .get(pointer, Some(key))
            .await
            .map_err(RecordError::blob(key))?;
        let record: StudentRecord =
            serde_json::from_slice(&bytes).map_err(|e| RecordError::Encoding {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        if record.registration_number != key {
            return Err(RecordError::Encoding {
                key: key.to_string(),
                reason: format!(
                    "snapshot entry carries registration number {:?}",
                    record.registration_number
                ),
            });
        }
        debug!(key, pointer = %pointer, "record resolved");
        Ok(record)
    }

    /// Apply one field update to a stored record and republish it.
    pub async fn update_field(&self, key: &str, update: FieldUpdate) -> RecordResult<StudentRecord> {
        let field = update.field();
        let record = self.update_with(key, |r| update.apply(r)).await?;
        debug!(key, field, "field updated");
        Ok(record)
    }

    /// Read-modify-write on a stored record.
    ///
    /// Not isolated from concurrent updates to the same key; the ledger's
    /// commit order decides which write lands last.
    pub async fn update_with<F>(&self, key: &str, edit: F) -> RecordResult<StudentRecord>
    where
        F: FnOnce(&mut StudentRecord) + Send,
    {
        let mut record = self.lookup(key).await?;
        edit(&mut record);
        if record.registration_number != key {
            return Err(RecordError::ImmutableKey {
                key: key.to_string(),
                attempted: record.registration_number,
            });
        }
        self.register(record.clone()).await?;
        Ok(record)
    }

    /// Every registered record, in key order.
    ///
    /// Any single failure aborts the scan; no partial result is returned.
    pub async fn list_all(&self) -> RecordResult<Vec<StudentRecord>> {
        self.list_range("", "").await
    }

    /// Records with keys in `[start, end)`. Empty bounds are open.
    pub async fn list_range(&self, start: &str, end: &str) -> RecordResult<Vec<StudentRecord>> {
        let range = format!("[{start}, {end})");
        let entries = self
            .pointers
            .list_keys(start, end)
            .await
            .map_err(RecordError::ledger(&range))?;

        let mut records = Vec::new();
        for entry in entries {
            let (key, pointer) = entry.map_err(|source| {
                let key = match &source {
                    LedgerError::MalformedEnvelope { key, .. } => key.clone(),
                    _ => range.clone(),
                };
                RecordError::Ledger { key, source }
            })?;
            records.push(self.fetch(&key, &pointer).await?);
        }
        debug!(start, end, count = records.len(), "records listed");
        Ok(records)
    }

    /// Register the fixed demo students.
    pub async fn init_ledger(&self) -> RecordResult<Vec<Pointer>> {
        let mut pointers = Vec::new();
        for student in demo_students() {
            pointers.push(self.register(student).await?);
        }
        info!(count = pointers.len(), "demo ledger initialized");
        Ok(pointers)
    }

    /// Rebuild the in-memory snapshot from what the ledger already points at.
    ///
    /// Afterwards the next write publishes a snapshot containing every known
    /// record, not just those written by this process. Returns how many
    /// records were added to the snapshot.
    pub async fn reseed(&self) -> RecordResult<usize> {
        let records = self.list_all().await?;
        let added = self.snapshot.seed(records);
        info!(added, total = self.snapshot.len(), "snapshot reseeded");
        Ok(added)
    }
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService")
            .field("snapshot_records", &self.snapshot.len())
            .field("pointers", &self.pointers)
            .finish_non_exhaustive()
    }
}
