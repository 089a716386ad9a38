use crate::account::Account;
use crate::blockchain::core::state::WorldState;
use crate::blockchain::core::validation::{validate_unique_transactions, BlockValidator};
use crate::config::ChainConfig;
use crate::contracts::ContractEngine;
use crate::crypto::{Address, Sha256Hash};
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Sentinel parent hash of the genesis block.
pub const PRE_GENESIS_BLOCK_HASH: Sha256Hash = [0u8; 32];

/// The single account seeded into the genesis world state.
pub const ROOT_ACCOUNT_ADDR: Address = [
    0xde, 0xad, 0xbe, 0xef, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00,
];

/// Balance the root account starts with.
pub const GENESIS_ALLOCATION: u64 = 1000;

static GENESIS_STATE: Lazy<WorldState> =
    Lazy::new(|| WorldState::new().with_account(Account::new_external(ROOT_ACCOUNT_ADDR, GENESIS_ALLOCATION)));

static GENESIS_BLOCK: Lazy<Block> =
    Lazy::new(|| Block::new(Vec::new(), PRE_GENESIS_BLOCK_HASH, GENESIS_STATE.signature()));

static GENESIS_HASH: Lazy<Sha256Hash> = Lazy::new(|| GENESIS_BLOCK.hash());

/// The fixed, hard-coded genesis block. Reproducible across runs: its hash
/// depends only on the constants above.
pub fn genesis_block() -> Block {
    GENESIS_BLOCK.clone()
}

/// The pre-seeded initial world state.
pub fn genesis_world_state() -> WorldState {
    GENESIS_STATE.clone()
}

/// An ordered batch of transactions plus a parent reference and a commitment
/// to the resulting world state. Immutable once constructed; the end state
/// signature is fixed at construction and only ever verified by independent
/// re-derivation, never recomputed in place.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub transactions: Vec<Transaction>,
    /// Back-reference to the parent block by content hash, for lookup only.
    pub prev_block_hash: Sha256Hash,
    /// Hash of the world state that results from applying this block's
    /// transactions, in order, to the state at the parent block.
    pub end_state_signature: Sha256Hash,
}

impl Block {
    pub fn new(
        transactions: Vec<Transaction>,
        prev_block_hash: Sha256Hash,
        end_state_signature: Sha256Hash,
    ) -> Self {
        Block {
            transactions,
            prev_block_hash,
            end_state_signature,
        }
    }

    /// Content hash over (parent, end state signature, transactions).
    pub fn hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update("block".as_bytes());
        hasher.update(self.prev_block_hash);
        hasher.update(self.end_state_signature);
        hasher.update((self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            hasher.update(tx.hash());
        }
        hasher.finalize().into()
    }

}

/// The chain: an append-only arena of blocks keyed by content hash, rooted at
/// genesis, plus the mempool of transactions awaiting inclusion.
///
/// Blocks reference parents by hash, never by pointer, so the admitted set
/// may form a tree (sibling forks). Admission is monotonic: nothing is ever
/// deleted or mutated after a block is accepted.
pub struct Blockchain {
    pub blocks: HashMap<Sha256Hash, Block>,
    pub mempool: Mempool,
    engine: Arc<dyn ContractEngine>,
    validators: Vec<Box<dyn BlockValidator>>,
    /// Memoized derived states keyed by block hash. Safe to cache forever:
    /// blocks and their resulting states are immutable once admitted.
    state_cache: Mutex<LruCache<Sha256Hash, WorldState>>,
}

impl Blockchain {
    /// Create a new chain containing only the genesis block.
    pub fn new(engine: Arc<dyn ContractEngine>) -> Self {
        Self::with_config(&ChainConfig::default(), engine)
    }

    pub fn with_config(config: &ChainConfig, engine: Arc<dyn ContractEngine>) -> Self {
        let genesis = genesis_block();
        let mut blocks = HashMap::new();
        blocks.insert(genesis.hash(), genesis);

        let cache_size =
            NonZeroUsize::new(config.state_cache_size).unwrap_or(NonZeroUsize::MIN);

        Blockchain {
            blocks,
            mempool: Mempool::new(),
            engine,
            validators: Vec::new(),
            state_cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    pub fn genesis_hash(&self) -> Sha256Hash {
        *GENESIS_HASH
    }

    pub fn engine(&self) -> &dyn ContractEngine {
        self.engine.as_ref()
    }

    /// Registers a pluggable policy check evaluated on every submitted block.
    pub fn register_validator(&mut self, validator: Box<dyn BlockValidator>) {
        self.validators.push(validator);
    }

    pub fn block_by_hash(&self, hash: &Sha256Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    pub fn contains_block(&self, hash: &Sha256Hash) -> bool {
        self.blocks.contains_key(hash)
    }

    /// Enqueues a transaction for inclusion in a future block after
    /// stateless well-formedness checks. Re-submitting an already queued
    /// transaction is a no-op.
    pub fn enqueue_transaction(&mut self, tx: Transaction) -> Result<Sha256Hash, ChainError> {
        tx.validate()?;
        let hash = tx.hash();
        self.mempool.insert(tx);
        Ok(hash)
    }

    /// Validates and admits a block.
    ///
    /// Genesis and already-admitted blocks are accepted idempotently.
    /// Otherwise the block's parent must be admitted (admission implies the
    /// whole ancestry back to genesis was validated in its turn), the end
    /// state signature must match an independent re-derivation, and every
    /// registered policy validator must accept. Admission is append-only.
    pub fn submit_block(&mut self, block: Block) -> Result<Sha256Hash, ChainError> {
        let hash = block.hash();
        if hash == self.genesis_hash() || self.contains_block(&hash) {
            return Ok(hash);
        }

        let end_state = self.validate_block_inner(&block)?;

        self.state_cache.lock().put(hash, end_state);
        self.blocks.insert(hash, block);
        Ok(hash)
    }

    /// Whether a block would be (or was) admitted by this chain.
    pub fn is_block_valid(&self, block: &Block) -> bool {
        self.validate_block_inner(block).is_ok()
    }

    fn validate_block_inner(&self, block: &Block) -> Result<WorldState, ChainError> {
        if block.hash() == self.genesis_hash() {
            return Ok(genesis_world_state());
        }

        // Parent must already be admitted. Blocks only enter through
        // validated submission, so an admitted parent is transitively valid
        // all the way to genesis by construction.
        if !self.contains_block(&block.prev_block_hash) {
            return Err(ChainError::UnknownOrInvalidParent(hex::encode(
                block.prev_block_hash,
            )));
        }

        validate_unique_transactions(block)?;

        let parent_state = self.derive_state(&block.prev_block_hash)?;

        let mut end_state = parent_state.clone();
        for tx in &block.transactions {
            end_state = end_state.apply_transaction(tx, self.engine.as_ref())?;
        }

        let derived = end_state.signature();
        if derived != block.end_state_signature {
            return Err(ChainError::StateSignatureMismatch {
                derived: hex::encode(derived),
                committed: hex::encode(block.end_state_signature),
            });
        }

        for validator in &self.validators {
            validator.validate(block, &parent_state)?;
        }

        Ok(end_state)
    }

    /// Derives the world state at the given block by replaying history from
    /// genesis, memoizing intermediate results by block hash.
    ///
    /// The admitted graph is acyclic by construction (a block is only ever
    /// admitted after its parent), so the ancestry walk is bounded by the
    /// number of admitted blocks; exceeding that bound is a programming
    /// invariant violation and panics rather than looping.
    pub fn derive_state(&self, block_hash: &Sha256Hash) -> Result<WorldState, ChainError> {
        // Walk back towards genesis until we hit a memoized state.
        let mut path: Vec<(Sha256Hash, &Block)> = Vec::new();
        let mut cursor = *block_hash;
        let mut state = loop {
            if cursor == self.genesis_hash() {
                break genesis_world_state();
            }
            if let Some(cached) = self.state_cache.lock().get(&cursor) {
                break cached.clone();
            }
            let block = self
                .blocks
                .get(&cursor)
                .ok_or_else(|| ChainError::UnknownOrInvalidParent(hex::encode(cursor)))?;
            path.push((cursor, block));
            cursor = block.prev_block_hash;

            if path.len() > self.blocks.len() {
                panic!(
                    "cycle detected in block ancestry at {}",
                    hex::encode(cursor)
                );
            }
        };

        // Fold forward from the nearest known state, caching as we go.
        for (hash, block) in path.iter().rev() {
            for tx in &block.transactions {
                state = state.apply_transaction(tx, self.engine.as_ref())?;
            }
            self.state_cache.lock().put(*hash, state.clone());
        }

        Ok(state)
    }

    /// The world state at the canonical tip.
    pub fn current_world_state(&self) -> Result<WorldState, ChainError> {
        self.derive_state(&self.tip_hash())
    }

    /// Canonical tip selection: the deepest-chain rule.
    ///
    /// Starting at genesis, repeatedly follow to the child whose subtree
    /// reaches deepest; when subtrees tie, the child with the lowest block
    /// hash wins. Fully deterministic for any admitted set.
    pub fn tip_hash(&self) -> Sha256Hash {
        let genesis_hash = self.genesis_hash();

        let mut children: HashMap<Sha256Hash, Vec<Sha256Hash>> = HashMap::new();
        for (hash, block) in &self.blocks {
            if *hash != genesis_hash {
                children.entry(block.prev_block_hash).or_default().push(*hash);
            }
        }

        // Subtree heights via post-order traversal, iterative to keep deep
        // chains off the call stack.
        let mut height: HashMap<Sha256Hash, u64> = HashMap::new();
        let mut stack = vec![(genesis_hash, false)];
        while let Some((hash, visited)) = stack.pop() {
            let kids = children.get(&hash);
            if visited || kids.is_none() {
                let h = kids
                    .into_iter()
                    .flatten()
                    .map(|k| height.get(k).copied().unwrap_or(0) + 1)
                    .max()
                    .unwrap_or(0);
                height.insert(hash, h);
            } else {
                stack.push((hash, true));
                for kid in kids.into_iter().flatten() {
                    stack.push((*kid, false));
                }
            }
        }

        let mut current = genesis_hash;
        while let Some(kids) = children.get(&current) {
            let best = kids
                .iter()
                .max_by(|a, b| {
                    let ha = height.get(*a).copied().unwrap_or(0);
                    let hb = height.get(*b).copied().unwrap_or(0);
                    // Deeper subtree first; lowest hash wins a tie.
                    ha.cmp(&hb).then_with(|| b.cmp(a))
                })
                .copied();
            match best {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    pub fn tip(&self) -> &Block {
        let hash = self.tip_hash();
        self.blocks
            .get(&hash)
            .expect("tip is always an admitted block")
    }
}
