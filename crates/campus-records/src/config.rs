use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};

/// Which blob store backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    Memory,
    Kubo,
}

/// Which ledger state backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Memory,
    File,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    pub backend: BlobBackend,
    /// Kubo RPC endpoint.
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::Kubo,
            endpoint: campus_blob::kubo::DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl BlobConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    /// State file for the `file` backend.
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::File,
            path: PathBuf::from(".campus/ledger.json"),
        }
    }
}

/// Configuration for a [`RecordService`](crate::RecordService).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusConfig {
    pub blob: BlobConfig,
    pub ledger: LedgerConfig,
}

impl CampusConfig {
    /// Everything in memory. For tests and throwaway sessions.
    pub fn in_memory() -> Self {
        Self {
            blob: BlobConfig {
                backend: BlobBackend::Memory,
                ..Default::default()
            },
            ledger: LedgerConfig {
                backend: LedgerBackend::Memory,
                ..Default::default()
            },
        }
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> RecordResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| RecordError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
            .map_err(|e| RecordError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> RecordResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| RecordError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> RecordResult<String> {
        toml::to_string_pretty(self).map_err(|e| RecordError::Config(e.to_string()))
    }

    /// Reject settings that cannot work together.
    ///
    /// A file ledger outlives the process but in-memory blobs do not, so that
    /// pairing would leave the ledger pointing at objects no later process can
    /// resolve.
    pub fn validate(&self) -> RecordResult<()> {
        if self.blob.backend == BlobBackend::Kubo && self.blob.endpoint.trim().is_empty() {
            return Err(RecordError::Config("blob.endpoint must be set for kubo".into()));
        }
        if self.ledger.backend == LedgerBackend::File && self.ledger.path.as_os_str().is_empty() {
            return Err(RecordError::Config("ledger.path must be set for file".into()));
        }
        if self.blob.backend == BlobBackend::Memory && self.ledger.backend == LedgerBackend::File {
            return Err(RecordError::Config(
                "a file ledger needs a durable blob store; use blob.backend = \"kubo\" or ledger.backend = \"memory\"".into(),
            ));
        }
        Ok(())
    }
}
