//! Transaction submission types for the chain boundary.
//!
//! These are the shapes exchanged with a transport implementation: the
//! request to submit, the pending hash, and the confirmed receipt including
//! emitted logs.

use alloy_primitives::{Address, Bytes, B256, U256};

/// A call ready for submission, before signing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
	/// Identity the transaction is sent (and signed) as.
	pub from: Address,
	/// Receiving contract.
	pub to: Address,
	/// Native currency forwarded with the call.
	pub value: U256,
	/// ABI-encoded calldata.
	pub data: Bytes,
}

/// Hash identifying a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

/// One log record emitted during a transaction's execution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
	/// Contract that emitted the log.
	pub address: Address,
	/// Indexed topics, signature hash first.
	pub topics: Vec<B256>,
	/// Unindexed data.
	pub data: Bytes,
}

/// Receipt of a transaction included in a block.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// Block the transaction was included in.
	pub block_number: u64,
	/// Whether execution succeeded.
	pub success: bool,
	/// Logs emitted during execution.
	pub logs: Vec<LogEntry>,
}
