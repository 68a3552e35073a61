use std::path::Path;

use hl_crypto::{BlockHasher, DigestAlgorithm, HashChainVerifier};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Configuration for a ledger instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Hash function for block digests.
    pub algorithm: DigestAlgorithm,
    /// When `true`, validation also recomputes the genesis digest and
    /// requires its `"0"` link. Off by default: the genesis block is the
    /// root of trust and the scan starts at position 1.
    pub verify_genesis: bool,
}

impl LedgerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, LedgerError> {
        toml::from_str(source).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn hasher(&self) -> BlockHasher {
        BlockHasher::new(self.algorithm)
    }

    pub fn verifier(&self) -> HashChainVerifier {
        HashChainVerifier::new(self.hasher()).with_genesis_check(self.verify_genesis)
    }
}
