use hl_types::{Digest, PreviousDigest};

use crate::hasher::{BlockHasher, HasherError};

/// Trait for records that participate in a hash chain.
pub trait ChainLink {
    /// The digest stored on the record when it was created.
    fn stored_digest(&self) -> Digest;
    /// The record's link to its predecessor.
    fn previous_digest(&self) -> PreviousDigest;
    /// A fresh digest over the record's current content.
    fn recompute_digest(&self, hasher: &BlockHasher) -> Result<Digest, HasherError>;
}

/// Hash chain integrity verifier.
///
/// Walks a sequence of records in order. For each checked record it first
/// recomputes the digest and compares it with the stored one, then checks
/// that the link matches the predecessor's stored digest.
///
/// The genesis record (index 0) is the root of trust and is skipped unless
/// [`HashChainVerifier::with_genesis_check`] is enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashChainVerifier {
    hasher: BlockHasher,
    verify_genesis: bool,
}

impl HashChainVerifier {
    pub fn new(hasher: BlockHasher) -> Self {
        Self {
            hasher,
            verify_genesis: false,
        }
    }

    /// Also recompute the genesis digest and require its sentinel link.
    pub fn with_genesis_check(mut self, enabled: bool) -> Self {
        self.verify_genesis = enabled;
        self
    }

    /// Verify a chain, stopping at the first failure.
    pub fn verify_chain(&self, links: &[impl ChainLink]) -> Result<(), ChainError> {
        match self.scan(links).next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Lazily yield every failure in scan order.
    ///
    /// Within one record a digest failure is reported before a link failure.
    pub fn scan<'a, L: ChainLink>(
        &'a self,
        links: &'a [L],
    ) -> impl Iterator<Item = ChainError> + 'a {
        let start = if self.verify_genesis { 0 } else { 1 };
        (start..links.len()).flat_map(move |index| self.check_at(links, index))
    }

    fn check_at<L: ChainLink>(&self, links: &[L], index: usize) -> Vec<ChainError> {
        let mut errors = Vec::new();
        let link = &links[index];

        match link.recompute_digest(&self.hasher) {
            Ok(computed) if computed == link.stored_digest() => {}
            Ok(_) => errors.push(ChainError::HashMismatch { index }),
            Err(e) => errors.push(ChainError::Unencodable {
                index,
                reason: e.to_string(),
            }),
        }

        let expected = match index {
            0 => PreviousDigest::Genesis,
            _ => PreviousDigest::Block(links[index - 1].stored_digest()),
        };
        if link.previous_digest() != expected {
            errors.push(ChainError::BrokenLink { index });
        }

        errors
    }

    pub fn hasher(&self) -> &BlockHasher {
        &self.hasher
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },

    #[error("broken link at index {index}: previous digest does not match")]
    BrokenLink { index: usize },

    #[error("record at index {index} cannot be encoded: {reason}")]
    Unencodable { index: usize, reason: String },
}

impl ChainError {
    /// Index of the offending record.
    pub fn index(&self) -> usize {
        match self {
            Self::HashMismatch { index }
            | Self::BrokenLink { index }
            | Self::Unencodable { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test record for chain verification.
    struct TestRecord {
        hash: Digest,
        prev: PreviousDigest,
        payload: Vec<u8>,
    }

    impl ChainLink for TestRecord {
        fn stored_digest(&self) -> Digest {
            self.hash
        }
        fn previous_digest(&self) -> PreviousDigest {
            self.prev
        }
        fn recompute_digest(&self, hasher: &BlockHasher) -> Result<Digest, HasherError> {
            let mut data = self.prev.to_string().into_bytes();
            data.extend_from_slice(&self.payload);
            Ok(hasher.hash(&data))
        }
    }

    fn build_chain(count: usize) -> Vec<TestRecord> {
        let mut chain: Vec<TestRecord> = Vec::new();
        let mut prev = PreviousDigest::Genesis;

        for i in 0..count {
            let mut record = TestRecord {
                hash: Digest::from_hash([0; 32]),
                prev,
                payload: format!("record-{i}").into_bytes(),
            };
            record.hash = record.recompute_digest(&BlockHasher::SHA256).unwrap();
            prev = PreviousDigest::Block(record.hash);
            chain.push(record);
        }

        chain
    }

    fn verifier() -> HashChainVerifier {
        HashChainVerifier::new(BlockHasher::SHA256)
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestRecord> = vec![];
        assert!(verifier().verify_chain(&chain).is_ok());
        assert!(verifier().with_genesis_check(true).verify_chain(&chain).is_ok());
    }

    #[test]
    fn multi_record_chain() {
        let chain = build_chain(10);
        assert!(verifier().verify_chain(&chain).is_ok());
        assert!(verifier().with_genesis_check(true).verify_chain(&chain).is_ok());
    }

    #[test]
    fn tampered_payload_detected() {
        let mut chain = build_chain(3);
        chain[1].payload = b"tampered".to_vec();
        let err = verifier().verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { index: 1 });
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = PreviousDigest::Block(Digest::from_hash([99; 32]));
        chain[2].hash = chain[2].recompute_digest(&BlockHasher::SHA256).unwrap();
        let err = verifier().verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::BrokenLink { index: 2 });
    }

    #[test]
    fn genesis_is_skipped_by_default() {
        let mut chain = build_chain(1);
        chain[0].payload = b"rewritten".to_vec();
        assert!(verifier().verify_chain(&chain).is_ok());
        assert_eq!(
            verifier().with_genesis_check(true).verify_chain(&chain).unwrap_err(),
            ChainError::HashMismatch { index: 0 }
        );
    }

    #[test]
    fn genesis_must_carry_sentinel_when_checked() {
        let mut chain = build_chain(1);
        chain[0].prev = PreviousDigest::Block(Digest::from_hash([1; 32]));
        chain[0].hash = chain[0].recompute_digest(&BlockHasher::SHA256).unwrap();
        assert_eq!(
            verifier().with_genesis_check(true).verify_chain(&chain).unwrap_err(),
            ChainError::BrokenLink { index: 0 }
        );
    }

    #[test]
    fn scan_reports_every_failure_in_order() {
        let mut chain = build_chain(4);
        chain[1].payload = b"x".to_vec();
        chain[3].payload = b"y".to_vec();
        let errors: Vec<_> = verifier().scan(&chain).collect();
        assert_eq!(
            errors,
            vec![
                ChainError::HashMismatch { index: 1 },
                ChainError::HashMismatch { index: 3 },
            ]
        );
        assert_eq!(errors[1].index(), 3);
    }

    #[test]
    fn wrong_algorithm_fails_verification() {
        let chain = build_chain(2);
        let err = HashChainVerifier::new(BlockHasher::BLAKE3)
            .verify_chain(&chain)
            .unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { index: 1 });
    }
}
