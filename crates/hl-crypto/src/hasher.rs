use std::fmt;
use std::str::FromStr;

use hl_types::Digest;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::canonical::to_canonical_json;

/// Hash function used to compute block digests.
///
/// Both produce 32-byte digests. SHA-256 is the default so that digests
/// line up with other implementations hashing the same canonical JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    #[serde(alias = "sha-256")]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = HasherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(HasherError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Block digest calculator.
///
/// Encodes values with [`to_canonical_json`] and hashes the bytes with the
/// configured [`DigestAlgorithm`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockHasher {
    algorithm: DigestAlgorithm,
}

impl BlockHasher {
    /// SHA-256 hasher.
    pub const SHA256: Self = Self {
        algorithm: DigestAlgorithm::Sha256,
    };
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: DigestAlgorithm::Blake3,
    };

    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash raw bytes.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let bytes: [u8; 32] = match self.algorithm {
            DigestAlgorithm::Sha256 => sha2::Sha256::digest(data).into(),
            DigestAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
        };
        Digest::from_hash(bytes)
    }

    /// Hash the canonical JSON encoding of a serializable value.
    pub fn hash_canonical<T: Serialize + ?Sized>(&self, value: &T) -> Result<Digest, HasherError> {
        let encoded = to_canonical_json(value)?;
        Ok(self.hash(&encoded))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),
}
