//! File-backed ledger state.
//!
//! [`FileLedgerKv`] keeps the whole state in memory and rewrites one JSON file
//! on every commit. The write goes to a temp file in the same directory which
//! is then renamed over the old file, so a crash leaves either the old or the
//! new state on disk, never a torn mix.
//!
//! On-disk format:
//! ```text
//! {"version":1,"state":{"<key>":"<hex of value bytes>", ...}}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::memory::scan;
use crate::traits::{LedgerKv, StateIterator};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    state: BTreeMap<String, String>,
}

/// A [`LedgerKv`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileLedgerKv {
    path: PathBuf,
    state: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl FileLedgerKv {
    /// Open (or create) the ledger file at `path`.
    ///
    /// A missing file is an empty ledger; it is created on the first commit.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            load(&path)?
        } else {
            BTreeMap::new()
        };
        info!(path = %path.display(), keys = state.len(), "file ledger opened");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.state.lock().map_err(|e| LedgerError::Transport {
            context: format!("file ledger {}", self.path.display()),
            reason: format!("lock poisoned: {e}"),
        })
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let bytes = fs::read(path)?;
    let file: LedgerFile = serde_json::from_slice(&bytes)
        .map_err(|e| LedgerError::Serialization(format!("{}: {e}", path.display())))?;
    if file.version != FORMAT_VERSION {
        return Err(LedgerError::Serialization(format!(
            "{}: unsupported ledger format version {}",
            path.display(),
            file.version
        )));
    }
    file.state
        .into_iter()
        .map(|(key, value)| {
            hex::decode(&value)
                .map(|bytes| (key.clone(), bytes))
                .map_err(|e| LedgerError::Serialization(format!("value under {key:?}: {e}")))
        })
        .collect()
}

fn persist(path: &Path, state: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    let file = LedgerFile {
        version: FORMAT_VERSION,
        state: state
            .iter()
            .map(|(k, v)| (k.clone(), hex::encode(v)))
            .collect(),
    };
    let bytes =
        serde_json::to_vec_pretty(&file).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| LedgerError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl LedgerKv for FileLedgerKv {
    async fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        next.insert(key.to_string(), value.to_vec());
        // Memory only changes once the file is durable.
        persist(&self.path, &next)?;
        *state = next;
        debug!(key, path = %self.path.display(), "state committed");
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIterator> {
        let state = self.lock()?;
        Ok(StateIterator::from_sorted(start, end, scan(&state, start, end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_types::ErrorKind;

    #[tokio::test]
    async fn missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileLedgerKv::open(dir.path().join("ledger.json")).unwrap();
        assert_eq!(kv.get_state("1001").await.unwrap(), None);
        assert!(!kv.path().exists());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");
        {
            let kv = FileLedgerKv::open(&path).unwrap();
            kv.put_state("1001", br#"{"cid":"x"}"#).await.unwrap();
            kv.put_state("1002", b"\x00\xff").await.unwrap();
        }
        let reopened = FileLedgerKv::open(&path).unwrap();
        assert_eq!(
            reopened.get_state("1001").await.unwrap(),
            Some(br#"{"cid":"x"}"#.to_vec())
        );
        assert_eq!(
            reopened.get_state("1002").await.unwrap(),
            Some(b"\x00\xff".to_vec())
        );
        let keys: Vec<_> = reopened
            .get_state_by_range("", "")
            .await
            .unwrap()
            .map(|kv| kv.key)
            .collect();
        assert_eq!(keys, vec!["1001", "1002"]);
    }

    #[tokio::test]
    async fn overwrite_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let kv = FileLedgerKv::open(&path).unwrap();
        kv.put_state("k", b"v1").await.unwrap();
        kv.put_state("k", b"v2").await.unwrap();
        let reopened = FileLedgerKv::open(&path).unwrap();
        assert_eq!(reopened.get_state("k").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn corrupt_file_is_encoding_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, b"{ definitely not a ledger").unwrap();
        let err = FileLedgerKv::open(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingFailure);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, br#"{"version":99,"state":{}}"#).unwrap();
        assert!(matches!(
            FileLedgerKv::open(&path),
            Err(LedgerError::Serialization(_))
        ));
    }

    #[test]
    fn bad_hex_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, br#"{"version":1,"state":{"k":"zz"}}"#).unwrap();
        assert!(FileLedgerKv::open(&path).is_err());
    }
}
