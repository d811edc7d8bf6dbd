//! Leaf and signed root records.
//!
//! [`MapLeaf`], [`DigitallySigned`] and [`MapperMetadata`] are stored as CBOR
//! blobs. [`SignedMapRoot`] is spread over the columns of the `MapHead`
//! relation, with its signature and metadata as blobs.

use crate::types::{KeyHash, MapId, Revision};
use serde::{Deserialize, Serialize};

/// A single key/value record of a map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLeaf {
    /// Hash of the key this leaf belongs to.
    pub key_hash: KeyHash,
    /// Leaf hash as computed by the tree hasher.
    #[serde(with = "serde_bytes")]
    pub leaf_hash: Vec<u8>,
    /// The value stored under the key.
    #[serde(with = "serde_bytes")]
    pub leaf_value: Vec<u8>,
    /// Application data carried alongside the value.
    #[serde(with = "serde_bytes")]
    pub extra_data: Vec<u8>,
}

impl MapLeaf {
    /// Creates a leaf holding `value` under `key_hash`.
    #[must_use]
    pub fn new(key_hash: KeyHash, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key_hash,
            leaf_value: value.into(),
            ..Self::default()
        }
    }

    /// Creates a leaf with no content. Writing it hides older values.
    #[must_use]
    pub fn tombstone(key_hash: KeyHash) -> Self {
        Self {
            key_hash,
            ..Self::default()
        }
    }

    /// Returns true if the leaf carries no hash, value or extra data.
    ///
    /// The key hash is identity, not content, and is ignored here.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaf_hash.is_empty() && self.leaf_value.is_empty() && self.extra_data.is_empty()
    }
}

/// Hash algorithm a signature was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// No hash.
    #[default]
    None,
    /// SHA-256.
    Sha256,
}

/// Algorithm that produced a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// Unsigned.
    #[default]
    Anonymous,
    /// RSA.
    Rsa,
    /// ECDSA.
    Ecdsa,
    /// Ed25519.
    Ed25519,
}

/// Signature bytes together with the algorithms that produced them.
///
/// revmap never computes or checks signatures; it only stores them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitallySigned {
    /// Hash algorithm.
    pub hash_algorithm: HashAlgorithm,
    /// Signature algorithm.
    pub signature_algorithm: SignatureAlgorithm,
    /// Raw signature.
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

/// Progress of the mapper that feeds a map from a source log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperMetadata {
    /// Identifier of the source log.
    #[serde(with = "serde_bytes")]
    pub source_log_id: Vec<u8>,
    /// Highest source sequence number fully applied to the map.
    pub highest_fully_completed_seq: i64,
    /// Highest source sequence number partially applied to the map.
    pub highest_partially_completed_seq: i64,
}

/// Signed summary of a map's state at one revision.
///
/// `SignedMapRoot::default()` is the zero-value root reported for a map
/// that has no roots yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedMapRoot {
    /// Wall-clock time the root was produced, in nanoseconds.
    pub timestamp_nanos: i64,
    /// Root hash of the map at `map_revision`.
    pub root_hash: Vec<u8>,
    /// Revision this root summarizes.
    pub map_revision: Revision,
    /// Signature over the root.
    pub signature: DigitallySigned,
    /// The map this root belongs to.
    pub map_id: MapId,
    /// Optional mapper progress.
    pub metadata: Option<MapperMetadata>,
}
