//! Snapshot assembly.
//!
//! A snapshot is the whole mapping from registration number to record. Every
//! write merges one record into the mapping and re-serializes all of it, so a
//! single blob always carries the complete known state. The cost of a write
//! grows with the number of records; that is the price of one addressable
//! whole-state object per write.
//!
//! Keys are held in a `BTreeMap`, so serialization emits them in sorted order
//! and identical logical content always produces identical bytes.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use campus_types::{validate_record_key, StudentRecord};

use crate::error::{RecordError, RecordResult};

/// The outcome of [`SnapshotAssembler::merge_and_serialize`]: the encoded
/// snapshot plus what is needed to undo the merge.
#[derive(Debug)]
pub struct Merged {
    key: String,
    pub bytes: Vec<u8>,
    written: StudentRecord,
    previous: Option<StudentRecord>,
}

/// Owner of the authoritative key → record mapping for one process.
///
/// Construct one per service (or per test). Merge and serialize happen
/// under one lock so a serialization never observes a half-applied merge.
#[derive(Debug, Default)]
pub struct SnapshotAssembler {
    records: Mutex<BTreeMap<String, StudentRecord>>,
}

impl SnapshotAssembler {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StudentRecord>> {
        // Each insert is a single map operation, so a poisoned map is still whole.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace `record` under `key`.
    pub fn merge(&self, key: &str, record: StudentRecord) -> RecordResult<()> {
        validate_record_key(key)?;
        self.lock().insert(key.to_string(), record);
        Ok(())
    }

    /// Encode the full mapping as a JSON object.
    pub fn serialize(&self) -> RecordResult<Vec<u8>> {
        encode(&self.lock())
    }

    /// Merge `record` under `key` and encode the resulting mapping, as one
    /// critical section.
    ///
    /// If encoding fails the merge is undone here. Once the bytes are handed
    /// out, the caller owns the outcome: if publishing them fails it must call
    /// [`revert`](Self::revert) with the returned [`Merged`], so the mapping
    /// never holds a record that was not published.
    pub fn merge_and_serialize(&self, key: &str, record: StudentRecord) -> RecordResult<Merged> {
        validate_record_key(key)?;
        let mut records = self.lock();
        let previous = records.insert(key.to_string(), record.clone());
        match encode(&records) {
            Ok(bytes) => Ok(Merged {
                key: key.to_string(),
                bytes,
                written: record,
                previous,
            }),
            Err(e) => {
                restore(&mut records, key, previous);
                Err(e)
            }
        }
    }

    /// Undo a merge whose snapshot was never published.
    ///
    /// Only restores if `key` still holds the record that merge wrote; a newer
    /// merge of the same key is left alone. Returns whether anything changed.
    pub fn revert(&self, merged: Merged) -> bool {
        let Merged {
            key,
            written,
            previous,
            ..
        } = merged;
        let mut records = self.lock();
        if records.get(&key) != Some(&written) {
            return false;
        }
        restore(&mut records, &key, previous);
        true
    }

    /// Merge records read back from the store. Records already present in
    /// memory win, since they are at least as new as anything published.
    ///
    /// Returns how many records were added.
    pub fn seed<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = StudentRecord>,
    {
        let mut map = self.lock();
        let before = map.len();
        for record in records {
            map.entry(record.registration_number.clone())
                .or_insert(record);
        }
        map.len() - before
    }

    pub fn get(&self, key: &str) -> Option<StudentRecord> {
        self.lock().get(key).cloned()
    }

    /// Keys in the mapping, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn restore(
    records: &mut BTreeMap<String, StudentRecord>,
    key: &str,
    previous: Option<StudentRecord>,
) {
    match previous {
        Some(old) => records.insert(key.to_string(), old),
        None => records.remove(key),
    };
}

fn encode(records: &BTreeMap<String, StudentRecord>) -> RecordResult<Vec<u8>> {
    serde_json::to_vec(records).map_err(|e| RecordError::Encoding {
        key: "<snapshot>".into(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_types::ErrorKind;
    use serde_json::{json, Value};

    fn student(key: &str, name: &str) -> StudentRecord {
        StudentRecord::new(key, name)
    }

    #[test]
    fn merge_accumulates() {
        let snap = SnapshotAssembler::new();
        snap.merge("1001", student("1001", "A")).unwrap();
        snap.merge("1002", student("1002", "B")).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.keys(), vec!["1001", "1002"]);
    }

    #[test]
    fn merge_replaces() {
        let snap = SnapshotAssembler::new();
        snap.merge("1001", student("1001", "A")).unwrap();
        snap.merge("1001", student("1001", "Z")).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("1001").unwrap().first_name, "Z");
    }

    #[test]
    fn merge_rejects_empty_key() {
        let snap = SnapshotAssembler::new();
        let err = snap.merge("", student("", "A")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert!(snap.is_empty());
    }

    #[test]
    fn serialize_is_whole_mapping() {
        let snap = SnapshotAssembler::new();
        snap.merge("1002", student("1002", "B")).unwrap();
        let bytes = snap
            .merge_and_serialize("1001", student("1001", "A"))
            .unwrap()
            .bytes;
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["1001"]["firstName"], json!("A"));
        assert_eq!(value["1002"]["firstName"], json!("B"));
        assert_eq!(bytes, snap.serialize().unwrap());
    }

    #[test]
    fn serialization_is_independent_of_insert_order() {
        let a = SnapshotAssembler::new();
        a.merge("1001", student("1001", "A")).unwrap();
        a.merge("1002", student("1002", "B")).unwrap();

        let b = SnapshotAssembler::new();
        b.merge("1002", student("1002", "B")).unwrap();
        b.merge("1001", student("1001", "A")).unwrap();

        assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
    }

    #[test]
    fn empty_snapshot_serializes_to_empty_object() {
        assert_eq!(SnapshotAssembler::new().serialize().unwrap(), b"{}");
    }

    #[test]
    fn seed_keeps_in_memory_records() {
        let snap = SnapshotAssembler::new();
        snap.merge("1001", student("1001", "fresh")).unwrap();
        let added = snap.seed([student("1001", "stale"), student("1002", "B")]);
        assert_eq!(added, 1);
        assert_eq!(snap.get("1001").unwrap().first_name, "fresh");
        assert_eq!(snap.get("1002").unwrap().first_name, "B");
    }

    #[test]
    fn revert_restores_previous_value() {
        let snap = SnapshotAssembler::new();
        snap.merge("1001", student("1001", "A")).unwrap();
        let merged = snap.merge_and_serialize("1001", student("1001", "Z")).unwrap();
        assert!(snap.revert(merged));
        assert_eq!(snap.get("1001").unwrap().first_name, "A");
    }

    #[test]
    fn revert_removes_new_key() {
        let snap = SnapshotAssembler::new();
        let merged = snap.merge_and_serialize("1001", student("1001", "A")).unwrap();
        assert!(snap.revert(merged));
        assert!(snap.is_empty());
        assert_eq!(snap.serialize().unwrap(), b"{}");
    }

    #[test]
    fn revert_leaves_newer_merge_alone() {
        let snap = SnapshotAssembler::new();
        let stale = snap.merge_and_serialize("1001", student("1001", "A")).unwrap();
        snap.merge("1001", student("1001", "B")).unwrap();
        assert!(!snap.revert(stale));
        assert_eq!(snap.get("1001").unwrap().first_name, "B");
    }

    #[test]
    fn instances_are_independent() {
        let a = SnapshotAssembler::new();
        let b = SnapshotAssembler::new();
        a.merge("1001", student("1001", "A")).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn concurrent_merges_never_lose_records() {
        use std::sync::Arc;
        use std::thread;

        let snap = Arc::new(SnapshotAssembler::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let snap = Arc::clone(&snap);
                thread::spawn(move || {
                    let key = format!("{:04}", i);
                    let bytes = snap
                        .merge_and_serialize(&key, student(&key, "N"))
                        .unwrap()
                        .bytes;
                    let value: Value = serde_json::from_slice(&bytes).unwrap();
                    // Every serialized snapshot contains the record just merged.
                    assert!(value.get(&key).is_some());
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(snap.len(), 16);
    }
}
