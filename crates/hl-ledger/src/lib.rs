//! Append-only, hash-linked ledger for HashLink.
//!
//! This crate is the heart of HashLink. It provides:
//! - `Block` records whose stored digest commits to position, timestamp,
//!   payload, and the predecessor's digest
//! - `Ledger`, the genesis-rooted owner of the block sequence, with append,
//!   tamper simulation, short-circuit validation, and snapshots
//! - Full validation reports listing every violation
//! - `SharedLedger`, a mutex-guarded handle for hosts with several callers
//! - `LedgerWriter` / `LedgerReader` trait boundaries

pub mod block;
pub mod config;
pub mod error;
pub mod ledger;
pub mod payload;
pub mod shared;
pub mod traits;
pub mod validation;

pub use block::{Block, BlockView};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use payload::{Payload, GENESIS_PAYLOAD};
pub use shared::SharedLedger;
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{ValidationReport, Violation, ViolationKind};

pub use hl_crypto::DigestAlgorithm;
pub use hl_types::{Digest, PreviousDigest, Timestamp};
