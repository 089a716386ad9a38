//! Contract execution seam.
//!
//! The ledger never executes code itself. Contract code is an opaque blob
//! handed to an external engine together with the contract's current storage
//! and the call arguments; the engine returns the new storage blob. The
//! invocation is assumed total, deterministic and side-effect-free with
//! respect to the ledger: an engine can only produce a new storage value,
//! never touch balances or other accounts.

/// External contract execution collaborator.
///
/// Implementations must be pure and deterministic: the same
/// `(code, storage, args)` triple must always yield the same storage blob.
pub trait ContractEngine: Send + Sync {
    /// Executes `code` against `storage` with `args`, returning the new
    /// storage blob.
    fn invoke(&self, code: &[u8], storage: &[u8], args: &[u8]) -> Vec<u8>;
}

/// Engine that leaves contract storage untouched.
///
/// Useful as the default collaborator when no runtime is wired in: calls
/// still move value and bump nonces, storage simply never changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopContractEngine;

impl ContractEngine for NoopContractEngine {
    fn invoke(&self, _code: &[u8], storage: &[u8], _args: &[u8]) -> Vec<u8> {
        storage.to_vec()
    }
}
