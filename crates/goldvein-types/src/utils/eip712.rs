//! EIP-712 hashing helpers shared by the signing crate.
//!
//! Provides the two domain type strings used by the protocol's verifiers,
//! the final digest computation (`0x1901 || domainHash || structHash`), and
//! a minimal word encoder for assembling struct-hash preimages.

use alloy_primitives::{keccak256, Address, B256, U256};

/// Domain type carrying a name field; used by the companion vault.
pub const NAMED_DOMAIN_TYPE: &str =
	"EIP712Domain(string name,uint256 chainId,address verifyingContract)";

/// Domain type without a name field; used by permit-capable tokens. The
/// asymmetry with [`NAMED_DOMAIN_TYPE`] is part of the wire format and must
/// not be "fixed".
pub const UNNAMED_DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";

/// Computes the final signing digest: `keccak256(0x19 || 0x01 ||
/// domainSeparator || structHash)`.
pub fn final_digest(domain_separator: &B256, struct_hash: &B256) -> B256 {
	let mut preimage = Vec::with_capacity(2 + 32 + 32);
	preimage.push(0x19);
	preimage.push(0x01);
	preimage.extend_from_slice(domain_separator.as_slice());
	preimage.extend_from_slice(struct_hash.as_slice());
	keccak256(preimage)
}

/// Word-by-word ABI encoder for the static field types appearing in this
/// protocol's domain separators and struct hashes.
#[derive(Debug, Default)]
pub struct Eip712Encoder {
	buf: Vec<u8>,
}

impl Eip712Encoder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_b256(&mut self, value: &B256) {
		self.buf.extend_from_slice(value.as_slice());
	}

	pub fn push_address(&mut self, address: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(address.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, value: U256) {
		self.buf.extend_from_slice(&value.to_be_bytes::<32>());
	}

	pub fn push_bool(&mut self, value: bool) {
		let mut word = [0u8; 32];
		word[31] = value as u8;
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
