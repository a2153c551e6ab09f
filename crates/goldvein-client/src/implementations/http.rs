//! Alloy-backed HTTP transport.
//!
//! Submits through a single provider whose wallet carries every identity
//! the client signs as; the transaction's `from` field selects the signer.
//! Confirmation is receipt polling with a configured interval and ceiling.

use std::sync::Arc;
use std::time::Duration;

#[allow(unused_imports)]
use alloy_consensus::TxReceipt as _;
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, FixedBytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_transport_http::Http;
use async_trait::async_trait;
use goldvein_config::{Config, SubmissionConfig};
use goldvein_signing::Identity;
use goldvein_types::{
	with_0x_prefix, LogEntry, Transaction, TransactionHash, TransactionReceipt,
};

use crate::{ClientError, SubmissionError, Transport};

/// HTTP transport over an alloy provider.
pub struct HttpTransport {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	confirmations: u64,
	poll_interval: Duration,
	timeout: Duration,
}

impl HttpTransport {
	/// Creates a transport for `rpc_url` able to sign as each of
	/// `identities`.
	pub fn new(
		rpc_url: &str,
		identities: &[Identity],
		settings: &SubmissionConfig,
	) -> Result<Self, SubmissionError> {
		let url = rpc_url
			.parse()
			.map_err(|e| SubmissionError::Network(format!("invalid RPC URL: {}", e)))?;

		let mut iter = identities.iter();
		let first = iter.next().ok_or_else(|| {
			SubmissionError::Network("at least one identity is required".to_string())
		})?;
		let mut wallet = EthereumWallet::from(first.signer().clone());
		for identity in iter {
			wallet.register_signer(identity.signer().clone());
		}

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		Ok(Self {
			provider: Arc::new(provider),
			confirmations: settings.confirmations,
			poll_interval: Duration::from_secs(settings.poll_interval_secs),
			timeout: Duration::from_secs(settings.timeout_secs),
		})
	}

	/// Builds a transport plus the configured identity.
	pub fn from_config(config: &Config) -> Result<(Arc<Self>, Identity), ClientError> {
		let identity = Identity::from_key(&config.account.private_key)?;
		let transport = Self::new(
			&config.network.rpc_url,
			std::slice::from_ref(&identity),
			&config.submission,
		)?;
		Ok((Arc::new(transport), identity))
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, SubmissionError> {
		let mut request = TransactionRequest::default().to(tx.to).input(tx.data.into());
		request.from = Some(tx.from);
		request.value = Some(tx.value);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| SubmissionError::Rejected(e.to_string()))?;

		let tx_hash = *pending.tx_hash();
		tracing::info!(
			tx_hash = %with_0x_prefix(&hex::encode(tx_hash.0)),
			"submitted transaction"
		);
		Ok(TransactionHash(tx_hash.0.to_vec()))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, SubmissionError> {
		let tx_hash = FixedBytes::<32>::from_slice(&hash.0);
		let started = tokio::time::Instant::now();

		loop {
			if started.elapsed() > self.timeout {
				return Err(SubmissionError::ConfirmationTimeout(with_0x_prefix(&hex::encode(
					&hash.0,
				))));
			}

			let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					// Not mined yet.
					tokio::time::sleep(self.poll_interval).await;
					continue;
				}
				Err(e) => {
					return Err(SubmissionError::Network(format!("failed to get receipt: {}", e)));
				}
			};

			let current_block = self
				.provider
				.get_block_number()
				.await
				.map_err(|e| SubmissionError::Network(format!("failed to get block number: {}", e)))?;

			let tx_block = receipt.block_number.unwrap_or(0);
			if current_block.saturating_sub(tx_block) + 1 < self.confirmations {
				tokio::time::sleep(self.poll_interval).await;
				continue;
			}

			let logs = receipt
				.inner
				.logs()
				.iter()
				.map(|log| LogEntry {
					address: log.inner.address,
					topics: log.inner.data.topics().to_vec(),
					data: log.inner.data.data.clone(),
				})
				.collect();

			tracing::info!(
				tx_hash = %with_0x_prefix(&hex::encode(&hash.0)),
				block = tx_block,
				success = receipt.status(),
				"transaction confirmed"
			);
			return Ok(TransactionReceipt {
				hash: TransactionHash(receipt.transaction_hash.0.to_vec()),
				block_number: tx_block,
				success: receipt.status(),
				logs,
			});
		}
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, SubmissionError> {
		let request = TransactionRequest::default().to(to).input(data.into());
		self.provider
			.call(&request)
			.await
			.map_err(|e| SubmissionError::Network(format!("call failed: {}", e)))
	}
}
