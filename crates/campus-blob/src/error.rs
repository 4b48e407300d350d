use campus_types::{ErrorKind, Pointer, TypeError};

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The pointer does not resolve to any object.
    #[error("object not found: {0}")]
    NotFound(Pointer),

    /// The object exists but a path segment does not resolve inside it.
    #[error("path {path:?} not found in {pointer}")]
    PathNotFound { pointer: Pointer, path: String },

    /// A path was given for an object that has no inner structure.
    #[error("object {0} is raw bytes and cannot be navigated")]
    NotNavigable(Pointer),

    /// Bytes could not be encoded or decoded in the requested format.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The store returned something that is not a valid pointer.
    #[error("invalid pointer from store: {0}")]
    InvalidPointer(#[from] TypeError),

    /// Network or RPC failure talking to the store.
    #[error("transport failure talking to {endpoint} ({context}): {reason}")]
    Transport {
        endpoint: String,
        context: String,
        reason: String,
    },
}

impl BlobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::PathNotFound { .. } => ErrorKind::NotFound,
            Self::NotNavigable(_) | Self::Encoding(_) | Self::InvalidPointer(_) => {
                ErrorKind::EncodingFailure
            }
            Self::Transport { .. } => ErrorKind::TransportFailure,
        }
    }
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
