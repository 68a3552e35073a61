//! Foundation types for HashLink.
//!
//! Every other HashLink crate depends on `hl-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — 32-byte content digest, rendered as lowercase hex
//! - [`PreviousDigest`] — Link to a predecessor, or the `"0"` genesis sentinel
//! - [`Timestamp`] — Microsecond-precision UTC capture of block creation time

pub mod digest;
pub mod error;
pub mod link;
pub mod timestamp;

pub use digest::Digest;
pub use error::TypeError;
pub use link::PreviousDigest;
pub use timestamp::Timestamp;
