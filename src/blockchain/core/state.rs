use crate::account::Account;
use crate::contracts::ContractEngine;
use crate::crypto::{Address, Sha256Hash};
use crate::error::ChainError;
use crate::transaction::{Transaction, TxPayload};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// The complete ledger at one point in history: a mapping from address to
/// account. States are ephemeral value objects produced by replaying
/// transactions from genesis; they are never independently mutated.
///
/// Accounts live in a `BTreeMap` so that iteration (and therefore the state
/// signature) follows a fixed, reproducible order regardless of how the
/// state was assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorldState {
    pub accounts: BTreeMap<Address, Account>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an account. Absence is a valid answer; the state never
    /// auto-creates - creation policy belongs to transaction application.
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Returns a new state with the given account inserted or replaced.
    /// The receiver is left untouched.
    pub fn with_account(&self, account: Account) -> WorldState {
        let mut accounts = self.accounts.clone();
        accounts.insert(account.address, account);
        WorldState { accounts }
    }

    /// Finds the account created by the given transaction, if any.
    pub fn account_created_by_tx_hash(&self, creation_tx_hash: &Sha256Hash) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.creation_tx_hash.as_ref() == Some(creation_tx_hash))
    }

    /// Deterministic hash of the canonical serialization of this state.
    ///
    /// Accounts are absorbed in address order with every field length-framed,
    /// so two logically equal states always produce the same signature.
    pub fn signature(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update("worldstate".as_bytes());
        hasher.update((self.accounts.len() as u64).to_le_bytes());
        for (address, account) in &self.accounts {
            hasher.update(address);
            hasher.update(account.nonce.to_le_bytes());
            hasher.update(account.balance.to_le_bytes());
            match &account.code {
                Some(code) => {
                    hasher.update([1u8]);
                    hasher.update((code.len() as u64).to_le_bytes());
                    hasher.update(code);
                }
                None => hasher.update([0u8]),
            }
            hasher.update((account.storage.len() as u64).to_le_bytes());
            hasher.update(&account.storage);
            match &account.creation_tx_hash {
                Some(hash) => {
                    hasher.update([1u8]);
                    hasher.update(hash);
                }
                None => hasher.update([0u8]),
            }
        }
        hasher.finalize().into()
    }

    /// Applies a transaction, producing the resulting state or an error.
    ///
    /// Pure: the receiver is never mutated, and on failure the input state is
    /// the only state there is. Checks run in a fixed order and short-circuit
    /// on the first failure: sender existence, nonce, balance, then the
    /// payload-specific rules. Once a transaction is accepted the sender's
    /// nonce is incremented by exactly one, for every payload shape.
    pub fn apply_transaction(
        &self,
        tx: &Transaction,
        engine: &dyn ContractEngine,
    ) -> Result<WorldState, ChainError> {
        let amount = tx.amount();

        let mut accounts = self.accounts.clone();
        {
            let sender = accounts
                .get_mut(&tx.sender)
                .ok_or_else(|| ChainError::UnknownSender(hex::encode(tx.sender)))?;

            if tx.nonce != sender.nonce {
                return Err(ChainError::NonceMismatch {
                    address: hex::encode(tx.sender),
                    expected: sender.nonce,
                    got: tx.nonce,
                });
            }

            if amount > sender.balance {
                return Err(ChainError::InsufficientBalance {
                    address: hex::encode(tx.sender),
                    requested: amount,
                    available: sender.balance,
                });
            }

            sender.nonce += 1;
            sender.balance -= amount;
        }

        match &tx.payload {
            TxPayload::CreateContract { code } => {
                if code.is_empty() {
                    return Err(ChainError::MissingContractCode);
                }
                // The new contract's address is the creation transaction's
                // own hash: deterministic, and distinct even when the same
                // code is deployed twice.
                let tx_hash = tx.hash();
                let contract = Account::new_contract(tx_hash, code.clone(), tx_hash);
                accounts.insert(contract.address, contract);
            }
            TxPayload::Transfer { to, .. } | TxPayload::Call { to, .. } => {
                let args: &[u8] = match &tx.payload {
                    TxPayload::Call { args, .. } => args,
                    _ => &[],
                };

                // A receiver never needs to pre-exist: create an empty
                // externally owned account on demand.
                let receiver = accounts.entry(*to).or_insert_with(|| {
                    Account::new_external(*to, 0).with_creation_tx_hash(tx.hash())
                });

                receiver.balance += amount;

                if let Some(code) = receiver.code.clone() {
                    receiver.storage = engine.invoke(&code, &receiver.storage, args);
                }
            }
        }

        Ok(WorldState { accounts })
    }
}
