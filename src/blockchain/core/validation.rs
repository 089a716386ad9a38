use crate::blockchain::core::chain::Block;
use crate::blockchain::core::state::WorldState;
use crate::error::ChainError;
use std::collections::HashSet;

/// A pluggable block-level policy check, evaluated during submission after
/// the core state-signature verification. Each validator can reject a block
/// independently.
///
/// This is the extension point for the policy checks the core deliberately
/// leaves open: timestamp freshness, difficulty targets, proof-of-work,
/// transaction-root commitments.
pub trait BlockValidator: Send + Sync {
    /// Name reported in rejection errors.
    fn name(&self) -> &'static str;

    /// Checks the block against the state at its parent.
    fn validate(&self, block: &Block, parent_state: &WorldState) -> Result<(), ChainError>;
}

/// Rejects blocks carrying more than a fixed number of transactions.
pub struct MaxTransactionsValidator {
    pub max: usize,
}

impl BlockValidator for MaxTransactionsValidator {
    fn name(&self) -> &'static str {
        "max_transactions"
    }

    fn validate(&self, block: &Block, _parent_state: &WorldState) -> Result<(), ChainError> {
        if block.transactions.len() > self.max {
            return Err(ChainError::PolicyRejected {
                validator: self.name(),
                reason: format!(
                    "block carries {} transactions (max: {})",
                    block.transactions.len(),
                    self.max
                ),
            });
        }
        Ok(())
    }
}

/// A block may include each transaction at most once.
pub fn validate_unique_transactions(block: &Block) -> Result<(), ChainError> {
    let mut seen = HashSet::new();
    for tx in &block.transactions {
        let hash = tx.hash();
        if !seen.insert(hash) {
            return Err(ChainError::MalformedTransaction(format!(
                "duplicate transaction {} in block",
                hex::encode(hash)
            )));
        }
    }
    Ok(())
}
