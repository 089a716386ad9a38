//! Shared chain handle: the in-process submission and query surface.
//!
//! A chain instance is a single logical actor, but multiple callers may
//! submit transactions, request mining and query state concurrently. The
//! node serializes every mutation behind a write lock (one critical section
//! per mutating call) while read-only derivations share a read lock and
//! therefore always observe a consistent snapshot of the admitted set.

use crate::blockchain::{Block, Blockchain, WorldState};
use crate::config::ChainConfig;
use crate::contracts::ContractEngine;
use crate::crypto::{short_hex, Sha256Hash};
use crate::error::ChainError;
use crate::miner;
use crate::transaction::Transaction;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct Node {
    chain: Arc<RwLock<Blockchain>>,
}

impl Node {
    pub fn new(engine: Arc<dyn ContractEngine>) -> Self {
        Node {
            chain: Arc::new(RwLock::new(Blockchain::new(engine))),
        }
    }

    pub fn with_config(config: &ChainConfig, engine: Arc<dyn ContractEngine>) -> Self {
        Node {
            chain: Arc::new(RwLock::new(Blockchain::with_config(config, engine))),
        }
    }

    /// Direct access to the underlying chain, for callers that need to
    /// register validators or batch several operations in one critical
    /// section.
    pub fn chain(&self) -> Arc<RwLock<Blockchain>> {
        Arc::clone(&self.chain)
    }

    /// Validates a transaction against the current tip state and enqueues it.
    ///
    /// Rejections carry the application error the transaction would hit:
    /// unknown sender, nonce mismatch (replays land here), insufficient
    /// balance, or a well-formedness failure. Rejected transactions never
    /// enter the mempool.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<Sha256Hash, ChainError> {
        let mut chain = self.chain.write();
        let state = chain.current_world_state()?;
        tx.validate_with_state(&state)?;
        let hash = chain.enqueue_transaction(tx)?;
        info!("Transaction {} enqueued", short_hex(&hash));
        Ok(hash)
    }

    /// Assembles and admits a new block from the mempool.
    pub fn mine_block(&self) -> Result<Block, ChainError> {
        let mut chain = self.chain.write();
        match miner::mine_block(&mut chain) {
            Ok(block) => Ok(block),
            Err(e) => {
                warn!("Mining failed: {}", e);
                Err(e)
            }
        }
    }

    /// Admits an externally assembled block (e.g. a competing fork).
    pub fn submit_block(&self, block: Block) -> Result<Sha256Hash, ChainError> {
        self.chain.write().submit_block(block)
    }

    /// The world state at the canonical tip.
    pub fn current_world_state(&self) -> Result<WorldState, ChainError> {
        self.chain.read().current_world_state()
    }

    pub fn block_by_hash(&self, hash: &Sha256Hash) -> Option<Block> {
        self.chain.read().block_by_hash(hash).cloned()
    }

    pub fn is_block_valid(&self, block: &Block) -> bool {
        self.chain.read().is_block_valid(block)
    }

    pub fn tip_hash(&self) -> Sha256Hash {
        self.chain.read().tip_hash()
    }

    pub fn genesis_hash(&self) -> Sha256Hash {
        self.chain.read().genesis_hash()
    }

    pub fn pending_transactions(&self) -> usize {
        self.chain.read().mempool.len()
    }
}
