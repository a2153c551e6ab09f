//! In-memory transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use goldvein_types::{LogEntry, Transaction, TransactionHash, TransactionReceipt};

use crate::{SubmissionError, Transport};

/// Records submissions and confirmations in order, without a network.
///
/// Hashes encode the submission index, so confirmation order is observable
/// alongside submission order through `events`.
pub(crate) struct MockTransport {
	pub transactions: Mutex<Vec<Transaction>>,
	pub events: Mutex<Vec<String>>,
	view_returns: Mutex<HashMap<[u8; 4], Vec<u8>>>,
	receipt_logs: Mutex<HashMap<usize, Vec<LogEntry>>>,
	revert_at: Mutex<Option<usize>>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self {
			transactions: Mutex::new(Vec::new()),
			events: Mutex::new(Vec::new()),
			view_returns: Mutex::new(HashMap::new()),
			receipt_logs: Mutex::new(HashMap::new()),
			revert_at: Mutex::new(None),
		}
	}

	/// Makes the submission at `index` confirm as reverted.
	pub fn revert_at(&self, index: usize) {
		*self.revert_at.lock().unwrap() = Some(index);
	}

	/// Fixes the return data for view calls with the given selector.
	pub fn set_view_return(&self, selector: [u8; 4], data: Vec<u8>) {
		self.view_returns.lock().unwrap().insert(selector, data);
	}

	/// Attaches logs to the receipt of the submission at `index`.
	pub fn set_receipt_logs(&self, index: usize, logs: Vec<LogEntry>) {
		self.receipt_logs.lock().unwrap().insert(index, logs);
	}
}

#[async_trait]
impl Transport for MockTransport {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, SubmissionError> {
		let mut transactions = self.transactions.lock().unwrap();
		let index = transactions.len();
		transactions.push(tx);
		self.events.lock().unwrap().push(format!("submit:{}", index));
		Ok(TransactionHash(vec![index as u8]))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, SubmissionError> {
		let index = hash.0[0] as usize;
		self.events.lock().unwrap().push(format!("confirm:{}", index));
		let success = *self.revert_at.lock().unwrap() != Some(index);
		let logs = self
			.receipt_logs
			.lock()
			.unwrap()
			.get(&index)
			.cloned()
			.unwrap_or_default();
		Ok(TransactionReceipt {
			hash: hash.clone(),
			block_number: index as u64 + 1,
			success,
			logs,
		})
	}

	async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, SubmissionError> {
		let mut selector = [0u8; 4];
		selector.copy_from_slice(&data[..4]);
		self.view_returns
			.lock()
			.unwrap()
			.get(&selector)
			.cloned()
			.map(Bytes::from)
			.ok_or_else(|| SubmissionError::Network("no view return configured".to_string()))
	}
}
