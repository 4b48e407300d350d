use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant shared by every error type in the workspace.
///
/// Callers branch on this instead of matching each crate's error enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No pointer for the key, or the pointer/path does not resolve.
    NotFound,
    /// Network or RPC failure talking to the ledger or the blob store.
    TransportFailure,
    /// Bytes could not be encoded or decoded.
    EncodingFailure,
    /// Caller input rejected before any I/O.
    ValidationFailure,
}

impl ErrorKind {
    /// Whether a caller-level retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::TransportFailure => write!(f, "transport failure"),
            Self::EncodingFailure => write!(f, "encoding failure"),
            Self::ValidationFailure => write!(f, "validation failure"),
        }
    }
}
