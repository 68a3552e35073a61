use hl_crypto::HasherError;

/// Errors produced by ledger operations.
///
/// Detected tampering and out-of-range tamper indices are not errors; they
/// are reported through boolean results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<HasherError> for LedgerError {
    fn from(err: HasherError) -> Self {
        match err {
            HasherError::Serialization(msg) => Self::Serialization(msg),
            HasherError::UnknownAlgorithm(name) => {
                Self::Config(format!("unknown digest algorithm: {name}"))
            }
        }
    }
}
