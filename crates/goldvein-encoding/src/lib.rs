//! Action-batch compilation for GoldVein pair operations.
//!
//! This crate maps semantic lending operations (deposit, withdraw, borrow,
//! repay, leveraged open/close) onto the ordered opcode+payload batches the
//! settlement contract executes atomically. Compilation is pure: nothing
//! here touches the network, and every byte of every payload is fixed by
//! the contract's decoding side.

/// Solidity interface definitions for the contracts this client encodes
/// calls against.
pub mod abi;
mod encoder;
mod external_call;

pub use encoder::{pair_init_data, ActionEncoder};
pub use external_call::ExternalCallPayload;

use thiserror::Error;

/// Errors produced while compiling operations into action batches.
#[derive(Debug, Error)]
pub enum EncodingError {
	/// An amount or share does not fit the settlement contract's signed
	/// payload fields.
	#[error("value {0} does not fit in int256")]
	ValueOutOfRange(String),
	/// Calldata is too short to strip the trailing word reserved for
	/// result injection.
	#[error("calldata too short to reserve a result slot: {len} bytes")]
	CalldataTooShort {
		/// Length of the calldata supplied.
		len: usize,
	},
	/// The operation arguments are inconsistent.
	#[error("invalid operation arguments: {0}")]
	InvalidArguments(String),
}
