use crate::block::BlockView;
use crate::error::LedgerError;
use crate::validation::ValidationReport;

/// Write boundary for hosts: append and tamper simulation.
pub trait LedgerWriter<P>: Send + Sync {
    fn append(&self, payload: P) -> Result<u64, LedgerError>;

    /// `Ok(false)` when `index` is out of range.
    fn tamper(&self, index: i64, new_payload: P) -> Result<bool, LedgerError>;
}

/// Read boundary for hosts: validation and snapshots.
pub trait LedgerReader<P>: Send + Sync {
    fn is_valid(&self) -> Result<bool, LedgerError>;

    fn verify(&self) -> Result<ValidationReport, LedgerError>;

    fn snapshot(&self) -> Result<Vec<BlockView<P>>, LedgerError>;

    fn block_count(&self) -> Result<usize, LedgerError>;
}
