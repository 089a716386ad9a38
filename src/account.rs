//! Account data model.
//!
//! An account holds a balance and a replay-protection nonce. A contract
//! account additionally carries an opaque code blob and an opaque storage
//! blob; both are interpreted only by the external contract engine, never by
//! the ledger itself. Whether an account is externally owned or a contract is
//! a pure function of whether `code` is present.

use crate::crypto::{Address, Sha256Hash};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, assigned at creation and never reassigned.
    pub address: Address,
    /// Monotonic counter of transactions originated by this account.
    pub nonce: u64,
    /// Spendable balance. Non-negative by construction.
    pub balance: u64,
    /// Opaque executable blob; `None` for externally owned accounts.
    #[serde(with = "serde_bytes")]
    pub code: Option<Vec<u8>>,
    /// Opaque storage blob, interpreted only by the contract engine.
    /// Each account owns its own buffer; there is no shared default.
    #[serde(with = "serde_bytes")]
    pub storage: Vec<u8>,
    /// Hash of the transaction that created this account, if any.
    /// Genesis-seeded accounts have none.
    pub creation_tx_hash: Option<Sha256Hash>,
}

impl Account {
    /// Creates an externally owned account with the given balance.
    pub fn new_external(address: Address, balance: u64) -> Self {
        Account {
            address,
            nonce: 0,
            balance,
            code: None,
            storage: Vec::new(),
            creation_tx_hash: None,
        }
    }

    /// Creates a contract account with zero balance and fresh storage.
    pub fn new_contract(address: Address, code: Vec<u8>, creation_tx_hash: Sha256Hash) -> Self {
        Account {
            address,
            nonce: 0,
            balance: 0,
            code: Some(code),
            storage: Vec::new(),
            creation_tx_hash: Some(creation_tx_hash),
        }
    }

    /// Records the transaction that brought this account into existence.
    pub fn with_creation_tx_hash(mut self, creation_tx_hash: Sha256Hash) -> Self {
        self.creation_tx_hash = Some(creation_tx_hash);
        self
    }

    /// Returns true if this account holds contract code.
    pub fn is_contract(&self) -> bool {
        self.code.is_some()
    }
}
