//! Integration tests for chain validation, mining and tip selection

use ledgerchain::blockchain::{
    genesis_block, genesis_world_state, Block, Blockchain, MaxTransactionsValidator,
    ROOT_ACCOUNT_ADDR,
};
use ledgerchain::contracts::{ContractEngine, NoopContractEngine};
use ledgerchain::crypto::Address;
use ledgerchain::error::ChainError;
use ledgerchain::miner;
use ledgerchain::node::Node;
use ledgerchain::transaction::Transaction;
use std::sync::Arc;

/// Helper to build a readable test address
fn addr(s: &str) -> Address {
    let mut address = [0u8; 32];
    let bytes = s.as_bytes();
    let len = bytes.len().min(32);
    address[..len].copy_from_slice(&bytes[..len]);
    address
}

/// Captures node and miner log output per test; repeated calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn new_chain() -> Blockchain {
    init_tracing();
    Blockchain::new(Arc::new(NoopContractEngine))
}

fn new_node() -> Node {
    init_tracing();
    Node::new(Arc::new(NoopContractEngine))
}

/// Engine that appends the call arguments to the contract's storage
struct AppendEngine;

impl ContractEngine for AppendEngine {
    fn invoke(&self, _code: &[u8], storage: &[u8], args: &[u8]) -> Vec<u8> {
        let mut next = storage.to_vec();
        next.extend_from_slice(args);
        next
    }
}

#[test]
fn genesis_is_reproducible_across_instances() {
    let a = new_chain();
    let b = new_chain();
    assert_eq!(a.genesis_hash(), b.genesis_hash());
    assert_eq!(genesis_block().hash(), a.genesis_hash());
    assert_eq!(
        genesis_world_state().signature(),
        genesis_block().end_state_signature
    );
}

#[test]
fn genesis_resubmission_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();
    let hash = chain.submit_block(genesis_block())?;
    assert_eq!(hash, chain.genesis_hash());
    assert!(chain.contains_block(&hash));
    assert_eq!(chain.blocks.len(), 1);
    assert!(chain.is_block_valid(&genesis_block()));
    Ok(())
}

#[test]
fn derive_state_is_pure_and_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();
    chain.enqueue_transaction(Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 0, 100))?;
    miner::mine_block(&mut chain)?;

    let tip = chain.tip_hash();
    let first = chain.derive_state(&tip)?;
    let second = chain.derive_state(&tip)?;
    assert_eq!(first.signature(), second.signature());
    Ok(())
}

#[test]
fn transfer_scenario_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let node = new_node();
    let bob = addr("bob");

    node.submit_transaction(Transaction::transfer(ROOT_ACCOUNT_ADDR, bob, 0, 100))?;
    let block = node.mine_block()?;

    let state = node.current_world_state()?;
    let root = state.get(&ROOT_ACCOUNT_ADDR).expect("root present");
    let receiver = state.get(&bob).expect("receiver present");
    assert_eq!(root.balance, 900);
    assert_eq!(root.nonce, 1);
    assert_eq!(receiver.balance, 100);
    assert_eq!(receiver.nonce, 0);

    assert!(node.is_block_valid(&block));
    assert_eq!(node.tip_hash(), block.hash());
    assert_eq!(node.block_by_hash(&block.hash()), Some(block));
    Ok(())
}

#[test]
fn replayed_transaction_is_rejected_at_submission() -> Result<(), Box<dyn std::error::Error>> {
    let node = new_node();
    let tx = Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 0, 100);

    node.submit_transaction(tx.clone())?;
    node.mine_block()?;

    // Same transaction again: the root account's nonce has moved on.
    let result = node.submit_transaction(tx.clone());
    assert_eq!(
        result,
        Err(ChainError::NonceMismatch {
            address: hex::encode(ROOT_ACCOUNT_ADDR),
            expected: 1,
            got: 0,
        })
    );
    assert_eq!(node.pending_transactions(), 0);

    // The next block must not contain the replay.
    let block = node.mine_block()?;
    assert!(block.transactions.is_empty());
    Ok(())
}

#[test]
fn contract_creation_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let node = new_node();
    let code = b"contract code".to_vec();

    let tx = Transaction::create_contract(ROOT_ACCOUNT_ADDR, 0, code.clone());
    let contract_addr = tx.hash();
    node.submit_transaction(tx.clone())?;
    node.mine_block()?;

    let state = node.current_world_state()?;
    let contract = state.get(&contract_addr).expect("contract present");
    assert_eq!(contract.code.as_deref(), Some(code.as_slice()));
    assert_eq!(contract.creation_tx_hash, Some(tx.hash()));
    assert_eq!(contract.balance, 0);
    Ok(())
}

#[test]
fn contract_call_runs_through_the_engine() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = Blockchain::new(Arc::new(AppendEngine));

    let create = Transaction::create_contract(ROOT_ACCOUNT_ADDR, 0, b"code".to_vec());
    let contract_addr = create.hash();
    chain.enqueue_transaction(create)?;
    miner::mine_block(&mut chain)?;

    chain.enqueue_transaction(Transaction::call(
        ROOT_ACCOUNT_ADDR,
        contract_addr,
        1,
        5,
        b"ping".to_vec(),
    ))?;
    miner::mine_block(&mut chain)?;

    let state = chain.current_world_state()?;
    let contract = state.get(&contract_addr).expect("contract present");
    assert_eq!(contract.storage, b"ping");
    assert_eq!(contract.balance, 5);
    assert_eq!(state.get(&ROOT_ACCOUNT_ADDR).expect("root").balance, 995);
    Ok(())
}

#[test]
fn mining_with_empty_mempool_repeats_parent_signature(
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();

    let first = miner::mine_block(&mut chain)?;
    let second = miner::mine_block(&mut chain)?;

    assert_ne!(first.hash(), second.hash());
    assert_eq!(
        first.end_state_signature,
        genesis_block().end_state_signature
    );
    assert_eq!(second.end_state_signature, first.end_state_signature);
    assert_eq!(second.prev_block_hash, first.hash());
    Ok(())
}

#[test]
fn tampered_end_state_signature_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();

    let mut signature = genesis_world_state().signature();
    signature[0] ^= 1;
    let block = Block::new(Vec::new(), chain.genesis_hash(), signature);

    let result = chain.submit_block(block.clone());
    assert!(matches!(
        result,
        Err(ChainError::StateSignatureMismatch { .. })
    ));
    assert!(!chain.is_block_valid(&block));
    assert_eq!(chain.blocks.len(), 1);
    Ok(())
}

#[test]
fn unknown_parent_is_rejected() {
    let mut chain = new_chain();
    let block = Block::new(Vec::new(), [0x42u8; 32], genesis_world_state().signature());

    let block_hash = block.hash();
    let result = chain.submit_block(block);
    assert!(matches!(result, Err(ChainError::UnknownOrInvalidParent(_))));
    assert!(!chain.contains_block(&block_hash));
}

#[test]
fn duplicate_transaction_in_block_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let chain = new_chain();
    let tx = Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 0, 10);

    let state = chain
        .derive_state(&chain.genesis_hash())?
        .apply_transaction(&tx, &NoopContractEngine)?;
    let block = Block::new(
        vec![tx.clone(), tx],
        chain.genesis_hash(),
        state.signature(),
    );

    assert!(!chain.is_block_valid(&block));
    Ok(())
}

#[test]
fn policy_validator_can_reject_and_leaves_mempool_untouched(
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();
    chain.register_validator(Box::new(MaxTransactionsValidator { max: 0 }));

    chain.enqueue_transaction(Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 0, 10))?;
    let result = miner::mine_block(&mut chain);

    assert!(matches!(result, Err(ChainError::PolicyRejected { .. })));
    assert_eq!(chain.mempool.len(), 1);
    assert_eq!(chain.blocks.len(), 1);
    Ok(())
}

#[test]
fn fork_choice_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();
    let genesis_hash = chain.genesis_hash();
    let genesis_signature = genesis_world_state().signature();

    // Two sibling children of genesis: one empty, one carrying a transfer.
    let empty_child = Block::new(Vec::new(), genesis_hash, genesis_signature);
    let tx = Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 0, 100);
    let busy_state = genesis_world_state().apply_transaction(&tx, &NoopContractEngine)?;
    let busy_child = Block::new(vec![tx], genesis_hash, busy_state.signature());

    let empty_hash = chain.submit_block(empty_child)?;
    let busy_hash = chain.submit_block(busy_child)?;
    assert_ne!(empty_hash, busy_hash);

    // Equal depths: the lower hash wins.
    let expected = empty_hash.min(busy_hash);
    assert_eq!(chain.tip_hash(), expected);

    // Extending the losing branch makes it the deepest, so the tip moves.
    let loser = empty_hash.max(busy_hash);
    let loser_signature = chain
        .block_by_hash(&loser)
        .expect("admitted")
        .end_state_signature;
    let extension = Block::new(Vec::new(), loser, loser_signature);
    let extension_hash = chain.submit_block(extension)?;
    assert_eq!(chain.tip_hash(), extension_hash);
    Ok(())
}

#[test]
fn transactions_submitted_during_assembly_stay_queued(
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = new_chain();
    chain.enqueue_transaction(Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 0, 50))?;
    miner::mine_block(&mut chain)?;

    // A transaction enqueued after the block was assembled is still pending.
    chain.enqueue_transaction(Transaction::transfer(ROOT_ACCOUNT_ADDR, addr("bob"), 1, 50))?;
    assert_eq!(chain.mempool.len(), 1);

    let block = miner::mine_block(&mut chain)?;
    assert_eq!(block.transactions.len(), 1);
    assert_eq!(chain.mempool.len(), 0);
    Ok(())
}
