//! Recoverable signature tuple.

use alloy_primitives::B256;

/// A recoverable secp256k1 signature in the split form on-chain verifiers
/// consume.
///
/// `v` is always normalized to 27 or 28. Tuples are delivered either
/// embedded in an action payload or out of band to the verifying contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Signature {
	/// Recovery id, 27 or 28.
	pub v: u8,
	/// First signature scalar.
	pub r: B256,
	/// Second signature scalar.
	pub s: B256,
}
