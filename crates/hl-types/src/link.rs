use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::Digest;
use crate::error::TypeError;

/// The link a block holds to its predecessor.
///
/// The genesis block has no predecessor and carries the fixed sentinel
/// `"0"` instead. Every other block carries its predecessor's stored digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviousDigest {
    Genesis,
    Block(Digest),
}

impl PreviousDigest {
    /// Textual sentinel used in place of a digest for the genesis block.
    pub const GENESIS_SENTINEL: &'static str = "0";

    /// Returns `true` for the genesis sentinel.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis)
    }

    /// The linked digest, if any.
    pub fn digest(&self) -> Option<&Digest> {
        match self {
            Self::Genesis => None,
            Self::Block(digest) => Some(digest),
        }
    }

    /// Returns `true` if this link points at `digest`.
    pub fn links_to(&self, digest: &Digest) -> bool {
        self.digest() == Some(digest)
    }
}

impl From<Digest> for PreviousDigest {
    fn from(digest: Digest) -> Self {
        Self::Block(digest)
    }
}

impl fmt::Debug for PreviousDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genesis => f.write_str("PreviousDigest(genesis)"),
            Self::Block(digest) => write!(f, "PreviousDigest({})", digest.short_hex()),
        }
    }
}

impl fmt::Display for PreviousDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genesis => f.write_str(Self::GENESIS_SENTINEL),
            Self::Block(digest) => fmt::Display::fmt(digest, f),
        }
    }
}

impl FromStr for PreviousDigest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::GENESIS_SENTINEL {
            return Ok(Self::Genesis);
        }
        Digest::from_hex(s).map(Self::Block)
    }
}

impl Serialize for PreviousDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PreviousDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
