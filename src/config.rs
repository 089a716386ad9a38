//! Configuration management for LedgerChain

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Number of derived world states memoized by block hash.
    #[serde(default = "default_state_cache_size")]
    pub state_cache_size: usize,
    /// Upper bound enforced by the optional `MaxTransactionsValidator`.
    #[serde(default = "default_max_block_transactions")]
    pub max_block_transactions: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            state_cache_size: default_state_cache_size(),
            max_block_transactions: default_max_block_transactions(),
        }
    }
}

impl ChainConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let contents = fs::read_to_string(path).map_err(|e| ChainError::Config(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ChainError::Config(e.to_string()))
    }
}

fn default_state_cache_size() -> usize {
    128
}

fn default_max_block_transactions() -> usize {
    1024
}
