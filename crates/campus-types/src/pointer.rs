use std::fmt;

use cid::Cid;
use multihash::Multihash;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// BLAKE3 multihash code.
const BLAKE3: u64 = 0x1e;

/// Multicodec of the object a pointer addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Opaque bytes (0x55).
    Raw,
    /// JSON mapping, navigable by path (0x0129).
    DagJson,
    /// CBOR mapping, navigable by path (0x71). What an IPFS node stores JSON as.
    DagCbor,
    /// Any other multicodec.
    Other(u64),
}

impl Codec {
    pub const fn code(&self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::DagJson => 0x0129,
            Self::DagCbor => 0x71,
            Self::Other(code) => *code,
        }
    }

    pub const fn from_code(code: u64) -> Self {
        match code {
            0x55 => Self::Raw,
            0x0129 => Self::DagJson,
            0x71 => Self::DagCbor,
            other => Self::Other(other),
        }
    }

    /// Whether objects with this codec can be navigated with a path.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::DagJson | Self::DagCbor)
    }
}

/// Content hash addressing an object in the blob store.
///
/// A `Pointer` is always a syntactically valid CID (v0 or v1). Identical
/// content always produces the same `Pointer`, so pointers can be published
/// to the ledger and resolved later by any client with access to the store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pointer {
    text: String,
    codec: u64,
}

impl Pointer {
    /// Parse and validate a CID string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let text = s.trim();
        if text.is_empty() {
            return Err(TypeError::InvalidPointer {
                value: s.to_string(),
                reason: "pointer must not be empty".into(),
            });
        }
        let cid = Cid::try_from(text).map_err(|e| TypeError::InvalidPointer {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            text: text.to_string(),
            codec: cid.codec(),
        })
    }

    /// Compute a CIDv1 over the BLAKE3 digest of `data`.
    pub fn from_blake3(codec: Codec, data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mh = Multihash::<64>::wrap(BLAKE3, digest.as_bytes())
            .expect("a 32-byte digest always fits a 64-byte multihash");
        let cid = Cid::new_v1(codec.code(), mh);
        Self {
            text: cid.to_string(),
            codec: codec.code(),
        }
    }

    /// The canonical CID string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Multicodec of the addressed object.
    pub fn codec(&self) -> Codec {
        Codec::from_code(self.codec)
    }

    /// Hex of the raw digest inside the CID.
    pub fn digest_hex(&self) -> String {
        Cid::try_from(self.text.as_str())
            .map(|cid| hex::encode(cid.hash().digest()))
            .unwrap_or_default()
    }

    /// Short form for logs (last 8 characters).
    pub fn short(&self) -> &str {
        let start = self.text.len().saturating_sub(8);
        &self.text[start..]
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({})", self.short())
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for Pointer {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pointer {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pointer> for String {
    fn from(pointer: Pointer) -> Self {
        pointer.text
    }
}
