//! Validation logic for transactions separated from type definitions

use crate::blockchain::WorldState;
use crate::error::ChainError;
use crate::transaction::types::{Transaction, TxPayload, MAX_TRANSACTION_SIZE};

impl Transaction {
    /// Stateless well-formedness checks, usable before any state is known.
    /// Does NOT validate nonce or balance - use validate_with_state() for that.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.sender == [0u8; 32] {
            return Err(ChainError::MalformedTransaction(
                "sender address cannot be empty".to_string(),
            ));
        }

        match &self.payload {
            TxPayload::CreateContract { code } => {
                if code.is_empty() {
                    return Err(ChainError::MissingContractCode);
                }
            }
            TxPayload::Transfer { to, .. } | TxPayload::Call { to, .. } => {
                if *to == [0u8; 32] {
                    return Err(ChainError::MalformedTransaction(
                        "receiver address cannot be empty".to_string(),
                    ));
                }
            }
        }

        self.validate_size()
    }

    /// Validate transaction size to prevent DoS attacks
    pub fn validate_size(&self) -> Result<(), ChainError> {
        let serialized = bincode::serialize(self)?;

        if serialized.len() > MAX_TRANSACTION_SIZE {
            return Err(ChainError::MalformedTransaction(format!(
                "transaction too large: {} bytes (max: {})",
                serialized.len(),
                MAX_TRANSACTION_SIZE
            )));
        }
        Ok(())
    }

    /// Validates this transaction against a world state without applying it.
    ///
    /// Used by the submission surface to reject transactions that could not
    /// apply to the current tip: unknown sender, stale or future nonce,
    /// or an amount the sender cannot cover.
    pub fn validate_with_state(&self, state: &WorldState) -> Result<(), ChainError> {
        self.validate()?;

        let sender = state
            .get(&self.sender)
            .ok_or_else(|| ChainError::UnknownSender(hex::encode(self.sender)))?;

        if self.nonce != sender.nonce {
            return Err(ChainError::NonceMismatch {
                address: hex::encode(self.sender),
                expected: sender.nonce,
                got: self.nonce,
            });
        }

        let amount = self.amount();
        if amount > sender.balance {
            return Err(ChainError::InsufficientBalance {
                address: hex::encode(self.sender),
                requested: amount,
                available: sender.balance,
            });
        }

        Ok(())
    }
}
