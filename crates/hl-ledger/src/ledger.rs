use hl_crypto::BlockHasher;
use hl_types::{PreviousDigest, Timestamp};
use tracing::{debug, info, warn};

use crate::block::{Block, BlockView};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::payload::Payload;
use crate::validation::ValidationReport;

/// Genesis-rooted, append-only sequence of blocks.
///
/// Never empty: position 0 always holds the genesis block. Positions are
/// contiguous and equal to each block's index in the sequence. The ledger
/// has no internal locking; wrap it in a [`SharedLedger`](crate::SharedLedger)
/// when several callers need it.
#[derive(Clone, Debug)]
pub struct Ledger<P> {
    config: LedgerConfig,
    hasher: BlockHasher,
    blocks: Vec<Block<P>>,
}

impl<P: Payload> Ledger<P> {
    /// Create a ledger with the default configuration.
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a ledger seeded with its genesis block.
    pub fn with_config(config: LedgerConfig) -> Result<Self, LedgerError> {
        let hasher = config.hasher();
        let genesis = Block::new(
            0,
            Timestamp::now(),
            P::genesis(),
            PreviousDigest::Genesis,
            &hasher,
        )?;
        info!(
            algorithm = %config.algorithm,
            digest = %genesis.digest().short_hex(),
            "ledger created"
        );

        Ok(Self {
            config,
            hasher,
            blocks: vec![genesis],
        })
    }

    /// Rebuild a ledger from exported views.
    ///
    /// Stored digests are taken as-is and never recomputed, so a tampered
    /// export stays detectably tampered. Only the structural invariants are
    /// enforced here: at least one block, positions contiguous from 0, the
    /// genesis sentinel link on block 0, and timestamps that never go
    /// backwards.
    pub fn from_snapshot(
        views: Vec<BlockView<P>>,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let Some(first) = views.first() else {
            return Err(LedgerError::InvalidSnapshot("snapshot contains no blocks".into()));
        };
        if !first.previous_digest.is_genesis() {
            return Err(LedgerError::InvalidSnapshot(format!(
                "genesis block must link to \"{}\", found {}",
                PreviousDigest::GENESIS_SENTINEL,
                first.previous_digest
            )));
        }
        for (index, view) in views.iter().enumerate() {
            if view.position != index as u64 {
                return Err(LedgerError::InvalidSnapshot(format!(
                    "expected position {index}, found {}",
                    view.position
                )));
            }
            if let Some(previous) = index.checked_sub(1).map(|i| &views[i]) {
                if view.timestamp < previous.timestamp {
                    return Err(LedgerError::InvalidSnapshot(format!(
                        "block {index} timestamp {} precedes block {} timestamp {}",
                        view.timestamp,
                        index - 1,
                        previous.timestamp
                    )));
                }
            }
        }

        let blocks: Vec<Block<P>> = views.into_iter().map(Block::from_view).collect();
        debug!(blocks = blocks.len(), "ledger restored from snapshot");

        Ok(Self {
            hasher: config.hasher(),
            config,
            blocks,
        })
    }

    /// Append a block carrying `payload` and return its position.
    ///
    /// On failure the ledger is left unchanged.
    pub fn append(&mut self, payload: P) -> Result<u64, LedgerError> {
        let last = self.last();
        let position = self.blocks.len() as u64;
        let timestamp = Timestamp::now_not_before(last.timestamp());
        let previous_digest = PreviousDigest::Block(*last.digest());

        let block = Block::new(position, timestamp, payload, previous_digest, &self.hasher)?;
        debug!(position, digest = %block.digest().short_hex(), "block appended");
        self.blocks.push(block);

        Ok(position)
    }

    /// Overwrite the payload at `index` without updating its digest.
    ///
    /// Returns `false` and changes nothing when `index` is outside
    /// `0..len`.
    pub fn tamper(&mut self, index: i64, new_payload: P) -> bool {
        let len = self.blocks.len();
        let Some(block) = usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks.get_mut(i))
        else {
            warn!(index, len, "tamper index out of range");
            return false;
        };

        block.set_payload(new_payload);
        info!(index, "block payload overwritten; stored digest left unchanged");
        true
    }

    /// Scan positions `1..len` and stop at the first stale digest or broken
    /// link.
    ///
    /// Genesis is only checked when `verify_genesis` is configured.
    pub fn is_valid(&self) -> bool {
        match self.config.verifier().verify_chain(&self.blocks) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "ledger invalid");
                false
            }
        }
    }

    /// Scan the same range as [`Ledger::is_valid`] and collect every
    /// violation.
    pub fn verify(&self) -> ValidationReport {
        let verifier = self.config.verifier();
        let report = ValidationReport::from_errors(self.blocks.len(), verifier.scan(&self.blocks));
        for violation in &report.violations {
            warn!(position = violation.position, kind = ?violation.kind, "integrity violation");
        }
        report
    }

    /// Read-only projection of every block, in order.
    pub fn snapshot(&self) -> Vec<BlockView<P>> {
        self.blocks.iter().map(Block::to_view).collect()
    }
}

impl<P> Ledger<P> {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, position: u64) -> Option<&Block<P>> {
        usize::try_from(position).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn genesis(&self) -> &Block<P> {
        &self.blocks[0]
    }

    /// The tail block.
    pub fn last(&self) -> &Block<P> {
        // never empty: genesis is pushed at construction and nothing is removed
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<P>> {
        self.blocks.iter()
    }

    pub fn blocks(&self) -> &[Block<P>] {
        &self.blocks
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

impl<'a, P> IntoIterator for &'a Ledger<P> {
    type Item = &'a Block<P>;
    type IntoIter = std::slice::Iter<'a, Block<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use hl_crypto::DigestAlgorithm;
    use hl_types::Digest;
    use proptest::prelude::*;
    use serde::ser::{Error as _, Serialize, Serializer};
    use serde_json::json;

    use super::*;
    use crate::validation::ViolationKind;

    fn ledger() -> Ledger<String> {
        Ledger::new().unwrap()
    }

    fn ledger_with(payloads: &[&str]) -> Ledger<String> {
        let mut l = ledger();
        for p in payloads {
            l.append(p.to_string()).unwrap();
        }
        l
    }

    #[test]
    fn new_ledger_holds_only_genesis() {
        let l = ledger();
        assert_eq!(l.len(), 1);
        assert!(!l.is_empty());
        assert!(l.is_valid());

        let genesis = l.genesis();
        assert_eq!(genesis.position(), 0);
        assert_eq!(genesis.payload(), "Genesis Block");
        assert!(genesis.previous_digest().is_genesis());
        assert!(genesis.is_genesis());
    }

    #[test]
    fn append_links_to_previous_tail() {
        let mut l = ledger();
        let genesis_digest = *l.genesis().digest();

        assert_eq!(l.append("A".into()).unwrap(), 1);
        assert_eq!(l.append("B".into()).unwrap(), 2);

        let a = l.get(1).unwrap();
        let b = l.get(2).unwrap();
        assert!(a.previous_digest().links_to(&genesis_digest));
        assert!(b.previous_digest().links_to(a.digest()));
        assert_eq!(l.last(), b);
    }

    #[test]
    fn positions_match_offsets_and_timestamps_never_decrease() {
        let l = ledger_with(&["a", "b", "c", "d", "e"]);
        for (offset, block) in l.iter().enumerate() {
            assert_eq!(block.position(), offset as u64);
        }
        for pair in l.blocks().windows(2) {
            assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn appended_digest_matches_fresh_computation() {
        let l = ledger_with(&["A"]);
        let block = l.last();
        let hasher = l.config().hasher();
        assert_eq!(block.compute_digest(&hasher).unwrap(), *block.digest());
    }

    #[test]
    fn reference_scenario() {
        let mut l = ledger_with(&["A", "B"]);
        assert!(l.is_valid());
        assert_eq!(l.len(), 3);

        assert!(l.tamper(1, "A-hacked".into()));
        assert!(!l.is_valid());

        assert!(!l.tamper(5, "x".into()));
        assert!(!l.is_valid());
        assert_eq!(l.get(1).unwrap().payload(), "A-hacked");
    }

    #[test]
    fn tamper_out_of_range_changes_nothing() {
        let mut l = ledger_with(&["A", "B"]);
        let before = l.snapshot();

        assert!(!l.tamper(-1, "x".into()));
        assert!(!l.tamper(l.len() as i64, "x".into()));
        assert!(!l.tamper(i64::MAX, "x".into()));
        assert!(!l.tamper(i64::MIN, "x".into()));

        assert_eq!(l.snapshot(), before);
        assert!(l.is_valid());
    }

    #[test]
    fn tamper_keeps_stored_digest() {
        let mut l = ledger_with(&["A"]);
        let digest = *l.get(1).unwrap().digest();
        assert!(l.tamper(1, "Z".into()));
        assert_eq!(*l.get(1).unwrap().digest(), digest);
    }

    #[test]
    fn tamper_genesis_alone_goes_unnoticed_by_default() {
        let mut l = ledger_with(&["A", "B"]);
        assert!(l.tamper(0, "rewritten genesis".into()));
        // block 1 links to genesis's stored digest, which did not change
        assert!(l.is_valid());

        let mut single = ledger();
        assert!(single.tamper(0, "rewritten genesis".into()));
        assert!(single.is_valid());
    }

    #[test]
    fn tamper_genesis_detected_with_genesis_check() {
        let config = LedgerConfig {
            verify_genesis: true,
            ..LedgerConfig::default()
        };
        let mut l: Ledger<String> = Ledger::with_config(config).unwrap();
        assert!(l.is_valid());
        l.append("A".into()).unwrap();
        assert!(l.tamper(0, "rewritten genesis".into()));
        assert!(!l.is_valid());
        assert_eq!(l.verify().first_invalid(), Some(0));
    }

    #[test]
    fn restoring_original_payload_restores_validity() {
        let mut l = ledger_with(&["A", "B"]);
        l.tamper(2, "evil".into());
        assert!(!l.is_valid());
        l.tamper(2, "B".into());
        assert!(l.is_valid());
    }

    #[test]
    fn validation_is_idempotent() {
        let mut l = ledger_with(&["A", "B", "C"]);
        let first = l.is_valid();
        assert!((0..5).all(|_| l.is_valid() == first));

        l.tamper(2, "X".into());
        assert!((0..5).all(|_| !l.is_valid()));
        assert_eq!(l.verify(), l.verify());
    }

    #[test]
    fn verify_reports_every_tampered_block() {
        let mut l = ledger_with(&["A", "B", "C", "D"]);
        l.tamper(1, "x".into());
        l.tamper(3, "y".into());

        let report = l.verify();
        assert!(!report.is_valid());
        assert_eq!(report.block_count, 5);
        assert!(!report.digests_consistent);
        assert!(report.links_intact);
        let positions: Vec<u64> = report.violations.iter().map(|v| v.position).collect();
        assert_eq!(positions, vec![1, 3]);
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::DigestMismatch));
    }

    #[test]
    fn verify_agrees_with_is_valid() {
        let mut l = ledger_with(&["A", "B"]);
        assert_eq!(l.verify().is_valid(), l.is_valid());
        l.tamper(2, "B'".into());
        assert_eq!(l.verify().is_valid(), l.is_valid());
    }

    #[test]
    fn snapshot_projects_every_field() {
        let l = ledger_with(&["A"]);
        let snapshot = l.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].payload, "Genesis Block");
        assert_eq!(snapshot[1].payload, "A");
        assert_eq!(snapshot[1].position, 1);
        assert_eq!(snapshot[1].digest, *l.get(1).unwrap().digest());
        assert_eq!(
            snapshot[1].previous_digest,
            PreviousDigest::Block(snapshot[0].digest)
        );
        assert_eq!(snapshot[1].timestamp, *l.get(1).unwrap().timestamp());
    }

    #[test]
    fn snapshot_roundtrip_preserves_tampering() {
        let mut l = ledger_with(&["A", "B"]);
        let clean = Ledger::from_snapshot(l.snapshot(), LedgerConfig::default()).unwrap();
        assert!(clean.is_valid());
        assert_eq!(clean.len(), 3);

        l.tamper(1, "A-hacked".into());
        let json = serde_json::to_string(&l.snapshot()).unwrap();
        let views: Vec<BlockView<String>> = serde_json::from_str(&json).unwrap();
        let restored = Ledger::from_snapshot(views, LedgerConfig::default()).unwrap();
        assert!(!restored.is_valid());
        assert_eq!(restored.verify().first_invalid(), Some(1));
    }

    #[test]
    fn restored_ledger_keeps_appending() {
        let l = ledger_with(&["A"]);
        let mut restored = Ledger::from_snapshot(l.snapshot(), LedgerConfig::default()).unwrap();
        assert_eq!(restored.append("B".into()).unwrap(), 2);
        assert!(restored.is_valid());
    }

    #[test]
    fn from_snapshot_rejects_structural_damage() {
        let l = ledger_with(&["A", "B"]);

        let empty: Vec<BlockView<String>> = vec![];
        assert!(matches!(
            Ledger::from_snapshot(empty, LedgerConfig::default()),
            Err(LedgerError::InvalidSnapshot(_))
        ));

        let mut gap = l.snapshot();
        gap.remove(1);
        assert!(matches!(
            Ledger::from_snapshot(gap, LedgerConfig::default()),
            Err(LedgerError::InvalidSnapshot(_))
        ));

        let mut rewound = l.snapshot();
        rewound[2].timestamp = Timestamp::from_unix_micros(rewound[1].timestamp.unix_micros() - 1).unwrap();
        let err = Ledger::from_snapshot(rewound, LedgerConfig::default()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSnapshot(msg) if msg.contains("precedes block 1")));

        let mut rooted = l.snapshot();
        rooted[0].previous_digest = PreviousDigest::Block(Digest::from_hash([1; 32]));
        assert!(matches!(
            Ledger::from_snapshot(rooted, LedgerConfig::default()),
            Err(LedgerError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn from_snapshot_accepts_equal_timestamps() {
        let l = ledger_with(&["A", "B"]);
        let mut views = l.snapshot();
        views[2].timestamp = views[1].timestamp;
        let restored = Ledger::from_snapshot(views, LedgerConfig::default()).unwrap();
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn relinked_block_breaks_chain() {
        let l = ledger_with(&["A", "B"]);
        let mut views = l.snapshot();
        views[2].previous_digest = PreviousDigest::Block(Digest::from_hash([7; 32]));
        let restored = Ledger::from_snapshot(views, LedgerConfig::default()).unwrap();

        let report = restored.verify();
        let kinds: Vec<ViolationKind> = report.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::DigestMismatch, ViolationKind::BrokenLink]);
        assert!(!report.links_intact);
    }

    #[test]
    fn blake3_ledger_is_valid() {
        let config = LedgerConfig {
            algorithm: DigestAlgorithm::Blake3,
            ..LedgerConfig::default()
        };
        let mut l: Ledger<String> = Ledger::with_config(config.clone()).unwrap();
        l.append("A".into()).unwrap();
        assert!(l.is_valid());

        // the same blocks do not verify under another algorithm
        let mismatched = Ledger::from_snapshot(l.snapshot(), LedgerConfig::default()).unwrap();
        assert!(!mismatched.is_valid());
    }

    #[test]
    fn json_payloads() {
        let mut l: Ledger<serde_json::Value> = Ledger::new().unwrap();
        l.append(json!({"from": "alice", "to": "bob", "amount": 5})).unwrap();
        l.append(json!([1, 2, 3])).unwrap();
        assert!(l.is_valid());
        assert_eq!(l.genesis().payload(), &json!("Genesis Block"));

        assert!(l.tamper(1, json!({"from": "alice", "to": "mallory", "amount": 5})));
        assert!(!l.is_valid());
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Fragile(bool);

    impl Serialize for Fragile {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.0 {
                Err(S::Error::custom("refusing to serialize"))
            } else {
                serializer.serialize_str("ok")
            }
        }
    }

    impl Payload for Fragile {
        fn genesis() -> Self {
            Fragile(false)
        }
    }

    #[test]
    fn failed_append_leaves_ledger_unchanged() {
        let mut l: Ledger<Fragile> = Ledger::new().unwrap();
        l.append(Fragile(false)).unwrap();

        let err = l.append(Fragile(true)).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(msg) if msg.contains("refusing")));
        assert_eq!(l.len(), 2);
        assert!(l.is_valid());
    }

    #[test]
    fn unencodable_tamper_invalidates() {
        let mut l: Ledger<Fragile> = Ledger::new().unwrap();
        l.append(Fragile(false)).unwrap();
        assert!(l.tamper(1, Fragile(true)));
        assert!(!l.is_valid());
        assert_eq!(l.verify().violations[0].kind, ViolationKind::Unencodable);
    }

    #[derive(Clone, Debug, PartialEq, serde::Serialize)]
    struct Reading {
        celsius: f64,
    }

    impl Payload for Reading {
        fn genesis() -> Self {
            Reading { celsius: 0.0 }
        }
    }

    #[test]
    fn non_finite_reading_is_refused_at_append() {
        let mut l: Ledger<Reading> = Ledger::new().unwrap();
        for celsius in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = l.append(Reading { celsius }).unwrap_err();
            assert!(matches!(err, LedgerError::Serialization(msg) if msg.contains("non-finite")));
        }
        assert_eq!(l.len(), 1);
        assert!(l.is_valid());
    }

    #[test]
    fn swapping_in_a_non_finite_reading_is_detected() {
        let mut l: Ledger<Reading> = Ledger::new().unwrap();
        l.append(Reading { celsius: 21.5 }).unwrap();
        l.append(Reading { celsius: 22.0 }).unwrap();
        assert!(l.is_valid());

        assert!(l.tamper(1, Reading { celsius: f64::INFINITY }));
        assert!(!l.is_valid());
        let report = l.verify();
        assert_eq!(report.first_invalid(), Some(1));
        assert_eq!(report.violations[0].kind, ViolationKind::Unencodable);

        assert!(l.tamper(1, Reading { celsius: f64::NAN }));
        assert!(!l.is_valid());
    }

    proptest! {
        #[test]
        fn appends_preserve_validity(payloads in proptest::collection::vec(".*", 0..16)) {
            let mut l = ledger();
            for (i, p) in payloads.into_iter().enumerate() {
                prop_assert_eq!(l.append(p).unwrap(), (i + 1) as u64);
                prop_assert!(l.is_valid());
            }
        }

        #[test]
        fn tampering_any_non_genesis_block_is_detected(
            count in 1usize..12,
            pick in any::<prop::sample::Index>(),
            replacement in ".*",
        ) {
            let mut l = ledger();
            for i in 0..count {
                l.append(format!("payload-{i}")).unwrap();
            }
            let index = 1 + pick.index(count);
            let original = l.get(index as u64).unwrap().payload().clone();
            prop_assume!(replacement != original);

            prop_assert!(l.tamper(index as i64, replacement));
            prop_assert!(!l.is_valid());
            prop_assert_eq!(l.verify().first_invalid(), Some(index as u64));
        }
    }
}
