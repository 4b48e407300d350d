//! Error types for ledger operations.

use campus_types::{ErrorKind, TypeError};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger backend could not be reached or refused the call.
    #[error("ledger transport failure ({context}): {reason}")]
    Transport { context: String, reason: String },

    /// I/O error from a file-backed ledger.
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted ledger state could not be encoded or decoded.
    #[error("ledger serialization error: {0}")]
    Serialization(String),

    /// The value stored under a key is not a pointer envelope.
    #[error("malformed pointer envelope under {key:?}: {reason}")]
    MalformedEnvelope { key: String, reason: String },

    /// The key was rejected before touching the ledger.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] TypeError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Io(_) => ErrorKind::TransportFailure,
            Self::Serialization(_) | Self::MalformedEnvelope { .. } => ErrorKind::EncodingFailure,
            Self::InvalidKey(e) => e.kind(),
        }
    }
}

/// Convenience type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
