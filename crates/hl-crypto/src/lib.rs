//! Cryptographic primitives for HashLink.
//!
//! Provides key-sorted canonical JSON encoding, SHA-256 and BLAKE3 block
//! digests, and hash chain verification over any sequence of linked records.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod canonical;
pub mod chain;
mod finite;
pub mod hasher;

pub use canonical::{canonical_value, to_canonical_json};
pub use chain::{ChainError, ChainLink, HashChainVerifier};
pub use hasher::{BlockHasher, DigestAlgorithm, HasherError};
