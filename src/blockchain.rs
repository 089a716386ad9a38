// Thin re-export module: implementation is in `blockchain/core.rs` to allow
// progressive decomposition of chain responsibilities (validation, chain
// management, state transitions).

pub mod core;
pub use core::*;
