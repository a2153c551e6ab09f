//! Authorization signing for the GoldVein client.
//!
//! This crate computes EIP-712 digests for the two off-chain authorization
//! message families consumed by the protocol's on-chain verifiers, vault
//! operator approvals and token permits, and produces recoverable
//! secp256k1 signatures over them. It performs no network access: the chain
//! id and every nonce are supplied by the caller, so a stale nonce surfaces
//! only as a remote rejection.

mod identity;
mod typed_data;

pub use identity::Identity;
pub use typed_data::{AuthorizationMessage, TypedDataSigner};

use thiserror::Error;

/// Errors that can occur while deriving keys or signing digests.
#[derive(Debug, Error)]
pub enum SigningError {
	/// Key material could not be parsed into a secp256k1 signing key.
	#[error("invalid key material: {0}")]
	InvalidKey(String),
	/// The underlying signer rejected the digest.
	#[error("signing failed: {0}")]
	SigningFailed(String),
}
