use hl_crypto::ChainError;
use serde::Serialize;

/// Result of a full ledger scan.
///
/// Unlike [`Ledger::is_valid`](crate::Ledger::is_valid), which stops at the
/// first failure, a report lists every violation the scan finds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub block_count: u64,
    pub digests_consistent: bool,
    pub links_intact: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub(crate) fn from_errors(
        block_count: usize,
        errors: impl IntoIterator<Item = ChainError>,
    ) -> Self {
        let violations: Vec<Violation> = errors.into_iter().map(Violation::from).collect();
        let digests_consistent = !violations
            .iter()
            .any(|v| matches!(v.kind, ViolationKind::DigestMismatch | ViolationKind::Unencodable));
        let links_intact = !violations
            .iter()
            .any(|v| v.kind == ViolationKind::BrokenLink);

        Self {
            block_count: block_count as u64,
            digests_consistent,
            links_intact,
            violations,
        }
    }

    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Position of the first block that failed a check.
    pub fn first_invalid(&self) -> Option<u64> {
        self.violations.first().map(|v| v.position)
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub position: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Stored digest differs from a fresh recomputation.
    DigestMismatch,
    /// Previous digest does not match the predecessor's stored digest.
    BrokenLink,
    /// Block content could not be encoded for recomputation.
    Unencodable,
}

impl From<ChainError> for Violation {
    fn from(err: ChainError) -> Self {
        let kind = match err {
            ChainError::HashMismatch { .. } => ViolationKind::DigestMismatch,
            ChainError::BrokenLink { .. } => ViolationKind::BrokenLink,
            ChainError::Unencodable { .. } => ViolationKind::Unencodable,
        };
        Self {
            position: err.index() as u64,
            kind,
            description: err.to_string(),
        }
    }
}
