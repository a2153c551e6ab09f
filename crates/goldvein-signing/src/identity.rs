//! Signing identities.

use std::fmt;

use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use goldvein_types::{SecretString, Signature};

use crate::SigningError;

/// One secp256k1 key and its derived address.
///
/// Identities are cheap to clone; handles bound to different identities can
/// coexist and submit independently.
#[derive(Clone)]
pub struct Identity {
	signer: PrivateKeySigner,
	address: Address,
}

impl Identity {
	/// Parses hex key material, with or without a `0x` prefix.
	pub fn from_key(key: &SecretString) -> Result<Self, SigningError> {
		let signer = key
			.with_exposed(|raw| raw.parse::<PrivateKeySigner>())
			.map_err(|e| SigningError::InvalidKey(e.to_string()))?;
		let address = signer.address();
		Ok(Self { signer, address })
	}

	/// Generates a fresh random identity, for tests and local tooling.
	pub fn random() -> Self {
		let signer = PrivateKeySigner::random();
		let address = signer.address();
		Self { signer, address }
	}

	/// The address derived from this identity's key.
	pub fn address(&self) -> Address {
		self.address
	}

	/// The underlying local signer, for transport wallet construction.
	pub fn signer(&self) -> &PrivateKeySigner {
		&self.signer
	}

	/// Signs a 32-byte digest, normalizing the recovery id to 27 or 28.
	pub fn sign_digest(&self, digest: B256) -> Result<Signature, SigningError> {
		let signature = self
			.signer
			.sign_hash_sync(&digest)
			.map_err(|e| SigningError::SigningFailed(e.to_string()))?;
		Ok(Signature {
			v: 27 + signature.v() as u8,
			r: B256::from(signature.r().to_be_bytes::<32>()),
			s: B256::from(signature.s().to_be_bytes::<32>()),
		})
	}
}

impl fmt::Debug for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Identity").field("address", &self.address).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;

	#[test]
	fn rejects_malformed_key_material() {
		let err = Identity::from_key(&SecretString::from("not a key")).unwrap_err();
		assert!(matches!(err, SigningError::InvalidKey(_)));
	}

	#[test]
	fn accepts_prefixed_and_bare_hex() {
		let bare = "4c0883a69102937d6231471b5dbb6204fe51296170827936ea5cce4b76994b0f";
		let prefixed = format!("0x{}", bare);
		let a = Identity::from_key(&SecretString::from(bare)).unwrap();
		let b = Identity::from_key(&SecretString::new(prefixed)).unwrap();
		assert_eq!(a.address(), b.address());
	}

	#[test]
	fn digest_signature_recovers_to_the_signer() {
		let identity = Identity::random();
		let digest = keccak256(b"authorization digest");

		let signature = identity.sign_digest(digest).unwrap();
		assert!(signature.v == 27 || signature.v == 28);

		// The split tuple must match the raw signature the key produces,
		// and that signature must recover to the identity's address.
		let raw = identity.signer.sign_hash_sync(&digest).unwrap();
		assert_eq!(signature.r, B256::from(raw.r().to_be_bytes::<32>()));
		assert_eq!(signature.s, B256::from(raw.s().to_be_bytes::<32>()));
		assert_eq!(signature.v, 27 + raw.v() as u8);
		assert_eq!(
			raw.recover_address_from_prehash(&digest).unwrap(),
			identity.address()
		);
	}

	#[test]
	fn debug_output_shows_only_the_address() {
		let identity = Identity::random();
		let debug = format!("{:?}", identity);
		assert!(debug.contains("address"));
		assert!(!debug.contains("signer"));
	}
}
