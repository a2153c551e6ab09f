//! Common types for the GoldVein client workspace.
//!
//! This crate defines the data model shared by the encoding, signing, and
//! client crates: the settlement contract's opcode set and action batches,
//! signature and transaction types, and small utilities for hex formatting
//! and EIP-712 hashing.

/// Action batch model for the settlement contract's `cook` entry point.
pub mod action;
/// Tagged address resolution for call targets.
pub mod call_target;
/// Transaction submission types for the chain boundary.
pub mod delivery;
/// Secure string type for private key material.
pub mod secret_string;
/// Recoverable signature tuple consumed by on-chain verifiers.
pub mod signature;
/// Hex formatting and EIP-712 hashing helpers.
pub mod utils;

// Re-export for convenient access
pub use action::{Action, ActionBatch, Opcode, EXACT_PRECEDING, FULL_PRECEDING};
pub use call_target::CallTarget;
pub use delivery::{LogEntry, Transaction, TransactionHash, TransactionReceipt};
pub use secret_string::SecretString;
pub use signature::Signature;
pub use utils::{with_0x_prefix, without_0x_prefix};
