//! The chain submission boundary.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use goldvein_types::{with_0x_prefix, Transaction, TransactionHash, TransactionReceipt};

use crate::SubmissionError;

/// Boundary to the chain: submits transactions and reports confirmations.
///
/// Implementations own signing, polling cadence, and timeouts. Retry and
/// backoff policy is theirs too; this crate never retries on its own.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Submits `tx`, signed as its `from` identity, and returns the pending
	/// hash.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, SubmissionError>;

	/// Suspends until the submission is confirmed, returning its receipt.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, SubmissionError>;

	/// Executes a read-only call and returns the raw return data.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, SubmissionError>;
}

/// A submission in flight.
///
/// Dropping this abandons nothing: once issued, the remote execution cannot
/// be withdrawn from this side. [`Submission::confirmed`] suspends until the
/// receipt arrives and fails if execution reverted.
pub struct Submission {
	hash: TransactionHash,
	transport: Arc<dyn Transport>,
}

impl Submission {
	pub(crate) fn new(hash: TransactionHash, transport: Arc<dyn Transport>) -> Self {
		Self { hash, transport }
	}

	/// Hash of the pending transaction.
	pub fn hash(&self) -> &TransactionHash {
		&self.hash
	}

	/// Waits for confirmation and checks execution success.
	pub async fn confirmed(self) -> Result<TransactionReceipt, SubmissionError> {
		let receipt = self.transport.wait_for_confirmation(&self.hash).await?;
		if !receipt.success {
			return Err(SubmissionError::Reverted(with_0x_prefix(&hex::encode(&self.hash.0))));
		}
		Ok(receipt)
	}
}

impl fmt::Debug for Submission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Submission").field("hash", &self.hash).finish()
	}
}
