use hl_crypto::{BlockHasher, ChainLink, HasherError};
use hl_types::{Digest, PreviousDigest, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One record in the ledger.
///
/// The digest is computed once, at construction, and stored. It is never
/// recomputed on read, and [`Block::set_payload`] leaves it alone. A block
/// whose payload was overwritten therefore carries a stale digest, which is
/// exactly what validation looks for.
#[derive(Clone, Debug, PartialEq)]
pub struct Block<P> {
    position: u64,
    timestamp: Timestamp,
    payload: P,
    previous_digest: PreviousDigest,
    digest: Digest,
}

/// The four committed fields, in the shape that gets hashed.
#[derive(Serialize)]
struct CommittedFields<'a, P> {
    position: u64,
    timestamp: &'a Timestamp,
    payload: &'a P,
    previous_digest: &'a PreviousDigest,
}

impl<P: Serialize> Block<P> {
    /// Build a block and store its digest.
    pub fn new(
        position: u64,
        timestamp: Timestamp,
        payload: P,
        previous_digest: PreviousDigest,
        hasher: &BlockHasher,
    ) -> Result<Self, LedgerError> {
        let digest = committed_digest(position, &timestamp, &payload, &previous_digest, hasher)?;
        Ok(Self {
            position,
            timestamp,
            payload,
            previous_digest,
            digest,
        })
    }

    /// Recompute the digest from the block's current fields.
    pub fn compute_digest(&self, hasher: &BlockHasher) -> Result<Digest, LedgerError> {
        Ok(committed_digest(
            self.position,
            &self.timestamp,
            &self.payload,
            &self.previous_digest,
            hasher,
        )?)
    }
}

impl<P> Block<P> {
    /// Overwrite the payload without touching the stored digest.
    pub fn set_payload(&mut self, new_payload: P) {
        self.payload = new_payload;
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn previous_digest(&self) -> &PreviousDigest {
        &self.previous_digest
    }

    /// The digest stored at construction time.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn is_genesis(&self) -> bool {
        self.position == 0
    }

    /// Rebuild a block from a view, keeping the view's digest as stored.
    pub(crate) fn from_view(view: BlockView<P>) -> Self {
        Self {
            position: view.position,
            timestamp: view.timestamp,
            payload: view.payload,
            previous_digest: view.previous_digest,
            digest: view.digest,
        }
    }
}

impl<P: Clone> Block<P> {
    /// Read-only projection of all five fields.
    pub fn to_view(&self) -> BlockView<P> {
        BlockView {
            position: self.position,
            timestamp: self.timestamp,
            payload: self.payload.clone(),
            digest: self.digest,
            previous_digest: self.previous_digest,
        }
    }
}

impl<P: Serialize> ChainLink for Block<P> {
    fn stored_digest(&self) -> Digest {
        self.digest
    }

    fn previous_digest(&self) -> PreviousDigest {
        self.previous_digest
    }

    fn recompute_digest(&self, hasher: &BlockHasher) -> Result<Digest, HasherError> {
        committed_digest(
            self.position,
            &self.timestamp,
            &self.payload,
            &self.previous_digest,
            hasher,
        )
    }
}

/// Snapshot of a block for display or export.
///
/// Serializes with the digest as hex, the genesis link as `"0"`, and the
/// timestamp in its committed text form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView<P> {
    pub position: u64,
    pub timestamp: Timestamp,
    pub payload: P,
    pub digest: Digest,
    pub previous_digest: PreviousDigest,
}

fn committed_digest<P: Serialize>(
    position: u64,
    timestamp: &Timestamp,
    payload: &P,
    previous_digest: &PreviousDigest,
    hasher: &BlockHasher,
) -> Result<Digest, HasherError> {
    hasher.hash_canonical(&CommittedFields {
        position,
        timestamp,
        payload,
        previous_digest,
    })
}
