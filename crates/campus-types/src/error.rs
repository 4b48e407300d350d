use thiserror::Error;

use crate::kind::ErrorKind;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid pointer {value:?}: {reason}")]
    InvalidPointer { value: String, reason: String },

    #[error("invalid record key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("required field missing: {field}")]
    MissingField { field: &'static str },
}

impl TypeError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPointer { .. } => ErrorKind::EncodingFailure,
            Self::InvalidKey { .. } | Self::MissingField { .. } => ErrorKind::ValidationFailure,
        }
    }
}
