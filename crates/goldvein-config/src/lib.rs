//! Configuration for the GoldVein client.
//!
//! Configuration is loaded from TOML and validated before use. The chain id
//! is always configured explicitly; nothing is discovered from an ambient
//! network connection.

use std::path::Path;

use alloy_primitives::Address;
use goldvein_types::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Network the client submits to.
	pub network: NetworkConfig,
	/// Protocol contract addresses on that network.
	pub contracts: ContractsConfig,
	/// Signing account.
	pub account: AccountConfig,
	/// Submission confirmation policy.
	#[serde(default)]
	pub submission: SubmissionConfig,
}

/// Network binding: one chain, one RPC endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// Chain id used for transaction signing and EIP-712 domains.
	pub chain_id: u64,
	/// HTTP RPC endpoint.
	pub rpc_url: String,
}

/// Deployed protocol contracts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractsConfig {
	/// Companion vault address.
	pub vault: Address,
	/// Master pair contract cloned on deploy, and the operator contract
	/// named in vault approvals.
	pub master_contract: Address,
	/// Default swapper for leveraged operations, if any.
	#[serde(default)]
	pub swapper: Option<Address>,
}

/// Signing account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex private key, 0x-prefixed or bare.
	pub private_key: SecretString,
}

/// Confirmation policy for submitted transactions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
	/// Confirmations required before a submission counts as final.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// Seconds between receipt polls.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	/// Ceiling on the total wait for one confirmation, in seconds.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_confirmations() -> u64 {
	1
}

fn default_poll_interval_secs() -> u64 {
	7
}

fn default_timeout_secs() -> u64 {
	600
}

impl Default for SubmissionConfig {
	fn default() -> Self {
		Self {
			confirmations: default_confirmations(),
			poll_interval_secs: default_poll_interval_secs(),
			timeout_secs: default_timeout_secs(),
		}
	}
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.chain_id == 0 {
			return Err(ConfigError::Validation("chain_id must be non-zero".to_string()));
		}
		if !self.network.rpc_url.starts_with("http://") && !self.network.rpc_url.starts_with("https://")
		{
			return Err(ConfigError::Validation(format!(
				"rpc_url must be an HTTP endpoint, got {}",
				self.network.rpc_url
			)));
		}
		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation("account.private_key is empty".to_string()));
		}
		if self.submission.poll_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"submission.poll_interval_secs must be non-zero".to_string(),
			));
		}
		Ok(())
	}
}
