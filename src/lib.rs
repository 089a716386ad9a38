//! LedgerChain - a minimal account-based ledger chain with deterministic state replay
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Chain
//! - [`blockchain`] - Block structure, chain arena, state derivation and validation
//! - [`transaction`] - Transaction types and operations
//! - [`mempool`] - Transaction mempool
//!
//! ## State Management
//! - [`account`] - Account data model (externally owned and contract accounts)
//!
//! ## Assembly
//! - [`miner`] - Block assembly from mempool contents
//!
//! ## Collaborators
//! - [`contracts`] - Contract execution seam (opaque, pluggable engine)
//! - [`node`] - Shared chain handle: submission and query surface
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`crypto`] - Content hashing and identifiers
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Chain
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// State Management
// ============================================================================
pub mod account;

// ============================================================================
// Assembly
// ============================================================================
pub mod miner;

// ============================================================================
// Collaborators
// ============================================================================
pub mod contracts;
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod crypto;
pub mod error;
