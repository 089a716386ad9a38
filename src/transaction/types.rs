//! Transaction types for LedgerChain

use crate::crypto::{Address, Sha256Hash};
use sha2::{Digest, Sha256};

/// Maximum transaction size in bytes (100KB) to prevent DoS
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

/// What a transaction does to the world state.
///
/// Value transfer and contract creation are mutually exclusive shapes:
/// a creation carries no amount at all.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TxPayload {
    /// Moves `amount` from the sender to `to`, creating the receiver
    /// on demand if it does not exist yet.
    Transfer { to: Address, amount: u64 },
    /// Deploys `code` as a new contract account.
    CreateContract {
        #[serde(with = "serde_bytes")]
        code: Vec<u8>,
    },
    /// Moves `amount` to `to` and invokes its contract code with `args`.
    Call {
        to: Address,
        amount: u64,
        #[serde(with = "serde_bytes")]
        args: Vec<u8>,
    },
}

/// An intent to mutate the world state. Immutable once constructed;
/// identity is the content hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender: Address,
    /// Must equal the sender account's nonce at application time.
    pub nonce: u64,
    pub payload: TxPayload,
}

impl Transaction {
    pub fn transfer(sender: Address, to: Address, nonce: u64, amount: u64) -> Self {
        Transaction {
            sender,
            nonce,
            payload: TxPayload::Transfer { to, amount },
        }
    }

    pub fn create_contract(sender: Address, nonce: u64, code: Vec<u8>) -> Self {
        Transaction {
            sender,
            nonce,
            payload: TxPayload::CreateContract { code },
        }
    }

    pub fn call(sender: Address, to: Address, nonce: u64, amount: u64, args: Vec<u8>) -> Self {
        Transaction {
            sender,
            nonce,
            payload: TxPayload::Call { to, amount, args },
        }
    }

    /// Value moved by this transaction. Contract creation moves none.
    pub fn amount(&self) -> u64 {
        match &self.payload {
            TxPayload::Transfer { amount, .. } => *amount,
            TxPayload::Call { amount, .. } => *amount,
            TxPayload::CreateContract { .. } => 0,
        }
    }

    /// Receiver address, if the payload names one.
    pub fn receiver(&self) -> Option<Address> {
        match &self.payload {
            TxPayload::Transfer { to, .. } => Some(*to),
            TxPayload::Call { to, .. } => Some(*to),
            TxPayload::CreateContract { .. } => None,
        }
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }

    /// Calculate the content hash of this transaction
    pub fn hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        match &self.payload {
            TxPayload::Transfer { to, amount } => {
                hasher.update("transfer".as_bytes());
                hasher.update(self.sender);
                hasher.update(self.nonce.to_le_bytes());
                hasher.update(to);
                hasher.update(amount.to_le_bytes());
            }
            TxPayload::CreateContract { code } => {
                hasher.update("create".as_bytes());
                hasher.update(self.sender);
                hasher.update(self.nonce.to_le_bytes());
                hasher.update((code.len() as u64).to_le_bytes());
                hasher.update(code);
            }
            TxPayload::Call { to, amount, args } => {
                hasher.update("call".as_bytes());
                hasher.update(self.sender);
                hasher.update(self.nonce.to_le_bytes());
                hasher.update(to);
                hasher.update(amount.to_le_bytes());
                hasher.update((args.len() as u64).to_le_bytes());
                hasher.update(args);
            }
        };
        hasher.finalize().into()
    }
}
