use std::sync::{Arc, Mutex, MutexGuard};

use crate::block::BlockView;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::payload::Payload;
use crate::traits::{LedgerReader, LedgerWriter};
use crate::validation::ValidationReport;

/// Cloneable handle to a ledger guarded by a single mutex.
///
/// Every operation holds the lock for its full duration, so an append never
/// interleaves with a validation scan.
pub struct SharedLedger<P> {
    inner: Arc<Mutex<Ledger<P>>>,
}

impl<P> Clone for SharedLedger<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Payload> SharedLedger<P> {
    pub fn new(ledger: Ledger<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` against the ledger while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Ledger<P>) -> R) -> Result<R, LedgerError> {
        let ledger = self.lock()?;
        Ok(f(&ledger))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger<P>>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl<P: Payload + Send> LedgerWriter<P> for SharedLedger<P> {
    fn append(&self, payload: P) -> Result<u64, LedgerError> {
        self.lock()?.append(payload)
    }

    fn tamper(&self, index: i64, new_payload: P) -> Result<bool, LedgerError> {
        Ok(self.lock()?.tamper(index, new_payload))
    }
}

impl<P: Payload + Send> LedgerReader<P> for SharedLedger<P> {
    fn is_valid(&self) -> Result<bool, LedgerError> {
        Ok(self.lock()?.is_valid())
    }

    fn verify(&self) -> Result<ValidationReport, LedgerError> {
        Ok(self.lock()?.verify())
    }

    fn snapshot(&self) -> Result<Vec<BlockView<P>>, LedgerError> {
        Ok(self.lock()?.snapshot())
    }

    fn block_count(&self) -> Result<usize, LedgerError> {
        Ok(self.lock()?.len())
    }
}
