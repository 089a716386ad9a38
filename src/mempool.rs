//! Transaction mempool: a staging set of not-yet-committed transactions.
//!
//! Transactions are keyed by content hash and kept in insertion order, so
//! block assembly folds them deterministically and never reorders. Nothing
//! here validates: the submission surface screens transactions before they
//! land, and the miner's state fold is the final authority.

use crate::crypto::Sha256Hash;
use crate::transaction::Transaction;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    txs: HashMap<Sha256Hash, Transaction>,
    order: Vec<Sha256Hash>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a transaction. Re-inserting an already queued transaction is
    /// a no-op; returns whether the transaction was newly added.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        let hash = tx.hash();
        if self.txs.contains_key(&hash) {
            return false;
        }
        self.txs.insert(hash, tx);
        self.order.push(hash);
        true
    }

    pub fn contains(&self, hash: &Sha256Hash) -> bool {
        self.txs.contains_key(hash)
    }

    pub fn remove(&mut self, hash: &Sha256Hash) -> Option<Transaction> {
        let removed = self.txs.remove(hash);
        if removed.is_some() {
            self.order.retain(|h| h != hash);
        }
        removed
    }

    /// Removes exactly the given transactions, leaving later arrivals queued.
    pub fn remove_all(&mut self, hashes: &[Sha256Hash]) {
        for hash in hashes {
            self.txs.remove(hash);
        }
        self.order.retain(|h| self.txs.contains_key(h));
    }

    /// The queued transactions in insertion order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.order
            .iter()
            .filter_map(|h| self.txs.get(h).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}
