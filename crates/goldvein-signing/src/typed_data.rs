//! EIP-712 digests for the protocol's authorization messages.
//!
//! Two message families exist. Vault operator approvals are verified by the
//! companion vault under a named domain ("Alpine V1") and embed one of two
//! fixed warning strings selected by the approval direction. Token permits
//! are verified by the token itself under a domain that deliberately omits
//! the name field; both layouts must match the on-chain verifiers bit for
//! bit.

use alloy_primitives::{keccak256, Address, B256, U256};
use goldvein_types::utils::{final_digest, Eip712Encoder, NAMED_DOMAIN_TYPE, UNNAMED_DOMAIN_TYPE};
use goldvein_types::Signature;

use crate::{Identity, SigningError};

const OPERATOR_APPROVAL_TYPE: &str = "SetMasterContractApproval(string warning,address user,address masterContract,bool approved,uint256 nonce)";
const PERMIT_TYPE: &str =
	"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

const VAULT_DOMAIN_NAME: &str = "Alpine V1";

// Warning strings recomputed verbatim by the vault's verifier.
const WARNING_GRANT: &str = "Give FULL access to funds in (and approved to) Alpine?";
const WARNING_REVOKE: &str = "Revoke access to Alpine?";

/// Off-chain authorization messages understood by the on-chain verifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationMessage {
	/// Grants or revokes a settlement contract's right to operate the
	/// user's vault balance.
	VaultOperatorApproval {
		/// Vault account owner granting the approval.
		user: Address,
		/// Contract being approved or revoked as operator.
		operator_contract: Address,
		/// Grant (`true`) or revoke (`false`).
		approved: bool,
		/// The user's current approval nonce on the vault.
		nonce: U256,
	},
	/// Token approval consumed on-chain through `permit`, avoiding a
	/// separate approval transaction.
	TokenPermit {
		/// Token holder.
		owner: Address,
		/// Account allowed to spend.
		spender: Address,
		/// Approved amount.
		value: U256,
		/// The owner's current permit nonce on the token.
		nonce: U256,
		/// Expiry timestamp of the permit.
		deadline: U256,
	},
}

/// Computes digests and signatures for [`AuthorizationMessage`]s.
///
/// The chain id is fixed at construction; nothing is discovered from an
/// ambient connection. All computation is pure and deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDataSigner {
	chain_id: u64,
}

impl TypedDataSigner {
	pub fn new(chain_id: u64) -> Self {
		Self { chain_id }
	}

	/// The chain id this signer scopes its domains to.
	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Domain separator of the vault's named domain.
	pub fn vault_domain_separator(&self, vault: Address) -> B256 {
		let mut enc = Eip712Encoder::new();
		enc.push_b256(&keccak256(NAMED_DOMAIN_TYPE.as_bytes()));
		enc.push_b256(&keccak256(VAULT_DOMAIN_NAME.as_bytes()));
		enc.push_u256(U256::from(self.chain_id));
		enc.push_address(&vault);
		keccak256(enc.finish())
	}

	/// Domain separator of a permit-capable token. Token verifiers hash a
	/// domain without a name field.
	pub fn token_domain_separator(&self, token: Address) -> B256 {
		let mut enc = Eip712Encoder::new();
		enc.push_b256(&keccak256(UNNAMED_DOMAIN_TYPE.as_bytes()));
		enc.push_u256(U256::from(self.chain_id));
		enc.push_address(&token);
		keccak256(enc.finish())
	}

	/// Computes the 32-byte signing digest of `message`.
	///
	/// `verifying_contract` is the vault address for operator approvals and
	/// the token address for permits.
	pub fn digest(&self, verifying_contract: Address, message: &AuthorizationMessage) -> B256 {
		match message {
			AuthorizationMessage::VaultOperatorApproval {
				user,
				operator_contract,
				approved,
				nonce,
			} => {
				let warning = if *approved { WARNING_GRANT } else { WARNING_REVOKE };
				let mut enc = Eip712Encoder::new();
				enc.push_b256(&keccak256(OPERATOR_APPROVAL_TYPE.as_bytes()));
				enc.push_b256(&keccak256(warning.as_bytes()));
				enc.push_address(user);
				enc.push_address(operator_contract);
				enc.push_bool(*approved);
				enc.push_u256(*nonce);
				let struct_hash = keccak256(enc.finish());
				final_digest(&self.vault_domain_separator(verifying_contract), &struct_hash)
			}
			AuthorizationMessage::TokenPermit {
				owner,
				spender,
				value,
				nonce,
				deadline,
			} => {
				let mut enc = Eip712Encoder::new();
				enc.push_b256(&keccak256(PERMIT_TYPE.as_bytes()));
				enc.push_address(owner);
				enc.push_address(spender);
				enc.push_u256(*value);
				enc.push_u256(*nonce);
				enc.push_u256(*deadline);
				let struct_hash = keccak256(enc.finish());
				final_digest(&self.token_domain_separator(verifying_contract), &struct_hash)
			}
		}
	}

	/// Signs `message` with `identity`, returning the split tuple.
	pub fn sign(
		&self,
		verifying_contract: Address,
		message: &AuthorizationMessage,
		identity: &Identity,
	) -> Result<Signature, SigningError> {
		identity.sign_digest(self.digest(verifying_contract, message))
	}
}
