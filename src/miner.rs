//! Block assembly: drains the mempool into a new block on the canonical tip.

use crate::blockchain::{Block, Blockchain};
use crate::crypto::{short_hex, Sha256Hash};
use crate::error::ChainError;
use tracing::{debug, info};

/// Assembles, submits and commits a new block from the current mempool.
///
/// The mempool snapshot is folded in insertion order through the state at
/// the tip to compute the end state commitment. If any transaction fails to
/// apply, the whole assembly fails with that transaction's error and the
/// mempool is left untouched, so the caller decides whether to drop or retry
/// it. On success exactly the included transactions are removed from the
/// mempool; transactions enqueued during assembly stay queued for the next
/// block.
///
/// An empty mempool still produces a valid (empty) block whose end state
/// signature equals its parent's.
pub fn mine_block(chain: &mut Blockchain) -> Result<Block, ChainError> {
    let tip_hash = chain.tip_hash();
    let snapshot = chain.mempool.snapshot();

    let mut state = chain.derive_state(&tip_hash)?;
    for tx in &snapshot {
        debug!("Applying transaction {} to prospective state", tx.hash_str());
        state = state.apply_transaction(tx, chain.engine())?;
    }

    let included: Vec<Sha256Hash> = snapshot.iter().map(|tx| tx.hash()).collect();
    let block = Block::new(snapshot, tip_hash, state.signature());

    let block_hash = chain.submit_block(block.clone())?;
    chain.mempool.remove_all(&included);

    info!(
        "Mined block {} with {} transaction(s) on parent {}",
        short_hex(&block_hash),
        included.len(),
        short_hex(&tip_hash)
    );
    Ok(block)
}
