use campus_blob::BlobError;
use campus_ledger::LedgerError;
use campus_types::{ErrorKind, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("no record registered under {key:?}")]
    NotFound { key: String },

    #[error("invalid record: {0}")]
    Invalid(#[from] TypeError),

    #[error("registration number is immutable: {key:?} cannot become {attempted:?}")]
    ImmutableKey { key: String, attempted: String },

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("record encoding error for {key:?}: {reason}")]
    Encoding { key: String, reason: String },

    #[error("blob store error for {key:?}: {source}")]
    Blob {
        key: String,
        #[source]
        source: BlobError,
    },

    #[error("ledger error for {key:?}: {source}")]
    Ledger {
        key: String,
        #[source]
        source: LedgerError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl RecordError {
    /// Failure class, preserved from whichever component failed.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Invalid(e) => e.kind(),
            Self::ImmutableKey { .. } | Self::UnknownField(_) | Self::Config(_) => {
                ErrorKind::ValidationFailure
            }
            Self::Encoding { .. } => ErrorKind::EncodingFailure,
            Self::Blob { source, .. } => source.kind(),
            Self::Ledger { source, .. } => source.kind(),
        }
    }

    pub(crate) fn blob(key: &str) -> impl FnOnce(BlobError) -> Self + '_ {
        move |source| Self::Blob {
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn ledger(key: &str) -> impl FnOnce(LedgerError) -> Self + '_ {
        move |source| Self::Ledger {
            key: key.to_string(),
            source,
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;
    use campus_types::{Codec, Pointer};

    #[test]
    fn kinds_are_preserved_through_wrapping() {
        let p = Pointer::from_blake3(Codec::DagJson, b"x");
        let blob = RecordError::blob("1001")(BlobError::NotFound(p));
        assert_eq!(blob.kind(), ErrorKind::NotFound);

        let transport = RecordError::ledger("1001")(LedgerError::Transport {
            context: "peer".into(),
            reason: "connection reset".into(),
        });
        assert_eq!(transport.kind(), ErrorKind::TransportFailure);
        assert!(transport.to_string().contains("1001"));

        let invalid = RecordError::from(TypeError::MissingField { field: "firstName" });
        assert_eq!(invalid.kind(), ErrorKind::ValidationFailure);
    }
}
