//! Actions and action batches for the settlement contract's `cook` entry
//! point.
//!
//! A batch is an ordered list of (opcode, native value, payload) triples
//! executed atomically and in order by the receiving contract. Two reserved
//! negative payload values let one action consume the result of the action
//! immediately before it without a round trip.

use alloy_primitives::{Bytes, I256, U256};

/// Sentinel share/amount value meaning "use the entire balance the
/// immediately preceding action produced".
pub const FULL_PRECEDING: I256 = I256::MINUS_ONE;

/// Sentinel share/amount value meaning "use the exact amount or share count
/// the immediately preceding action produced". Distinct unit convention from
/// [`FULL_PRECEDING`]; the two are not interchangeable.
pub const EXACT_PRECEDING: I256 =
	I256::from_raw(U256::from_limbs([u64::MAX - 1, u64::MAX, u64::MAX, u64::MAX]));

/// Opcodes understood by the settlement contract's `cook` dispatcher.
///
/// Discriminants are the contract's fixed wire values. The opcodes fall into
/// four families: balance-affecting operations that require interest accrual
/// first, operations that do not, companion-vault operations, and the
/// generic external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
	/// Credit asset shares to a lender position.
	AddAsset = 1,
	/// Repay borrowed parts.
	Repay = 2,
	/// Withdraw asset shares from a lender position.
	RemoveAsset = 3,
	/// Withdraw collateral shares.
	RemoveCollateral = 4,
	/// Open or increase a borrow position.
	Borrow = 5,
	/// Convert a borrow part count to its current share equivalent.
	GetRepayShare = 6,
	/// Convert an amount to its current borrow part equivalent.
	GetRepayPart = 7,
	/// Credit collateral shares; the only balance operation exempt from
	/// prior accrual.
	AddCollateral = 10,
	/// Deposit tokens into the companion vault.
	VaultDeposit = 20,
	/// Withdraw tokens from the companion vault.
	VaultWithdraw = 21,
	/// Move vault shares to another account.
	VaultTransfer = 22,
	/// Move vault shares to several accounts at once.
	VaultTransferMultiple = 23,
	/// Set an operator approval on the vault from an embedded signature.
	VaultSetApproval = 24,
	/// Call an arbitrary third-party contract.
	Call = 30,
}

impl Opcode {
	/// Wire value submitted to the contract.
	pub const fn as_u8(self) -> u8 {
		self as u8
	}

	/// Whether the contract accrues interest before executing this opcode.
	pub const fn requires_accrual(self) -> bool {
		matches!(
			self,
			Opcode::AddAsset
				| Opcode::Repay
				| Opcode::RemoveAsset
				| Opcode::RemoveCollateral
				| Opcode::Borrow
				| Opcode::GetRepayShare
				| Opcode::GetRepayPart
		)
	}

	/// Whether this opcode executes on the companion vault rather than the
	/// pair itself.
	pub const fn is_vault_op(self) -> bool {
		matches!(
			self,
			Opcode::VaultDeposit
				| Opcode::VaultWithdraw
				| Opcode::VaultTransfer
				| Opcode::VaultTransferMultiple
				| Opcode::VaultSetApproval
		)
	}
}

/// One entry of a batch: opcode, attached native value, and ABI-encoded
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
	/// Dispatcher opcode.
	pub opcode: Opcode,
	/// Native currency forwarded with this action.
	pub native_value: U256,
	/// ABI-encoded arguments, layout fixed per opcode.
	pub payload: Bytes,
}

impl Action {
	/// Creates an action carrying no native value.
	pub fn new(opcode: Opcode, payload: Bytes) -> Self {
		Self {
			opcode,
			native_value: U256::ZERO,
			payload,
		}
	}

	/// Attaches a native value to the action.
	pub fn with_native_value(mut self, value: U256) -> Self {
		self.native_value = value;
		self
	}
}

/// An ordered action sequence submitted as one atomic `cook` call.
///
/// The three argument arrays handed to the contract are always equal length
/// and index-aligned; the batch guarantees this by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionBatch {
	actions: Vec<Action>,
}

impl ActionBatch {
	/// Creates an empty batch.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a batch from an already-ordered action list.
	pub fn from_actions(actions: Vec<Action>) -> Self {
		Self { actions }
	}

	/// Appends an action at the end of the batch.
	pub fn push(&mut self, action: Action) {
		self.actions.push(action);
	}

	/// Number of actions in the batch.
	pub fn len(&self) -> usize {
		self.actions.len()
	}

	/// Whether the batch contains no actions.
	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}

	/// The actions in submission order.
	pub fn actions(&self) -> &[Action] {
		&self.actions
	}

	/// Total native value forwarded with the batch.
	pub fn total_native_value(&self) -> U256 {
		self.actions
			.iter()
			.fold(U256::ZERO, |acc, action| acc.saturating_add(action.native_value))
	}

	/// Splits the batch into the index-aligned `cook` argument arrays.
	pub fn into_cook_args(self) -> (Vec<u8>, Vec<U256>, Vec<Bytes>) {
		let mut opcodes = Vec::with_capacity(self.actions.len());
		let mut values = Vec::with_capacity(self.actions.len());
		let mut payloads = Vec::with_capacity(self.actions.len());
		for action in self.actions {
			opcodes.push(action.opcode.as_u8());
			values.push(action.native_value);
			payloads.push(action.payload);
		}
		(opcodes, values, payloads)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sentinels_are_minus_one_and_minus_two() {
		assert_eq!(FULL_PRECEDING, I256::try_from(-1i64).unwrap());
		assert_eq!(EXACT_PRECEDING, I256::try_from(-2i64).unwrap());
	}

	#[test]
	fn opcode_wire_values_are_fixed() {
		assert_eq!(Opcode::AddAsset.as_u8(), 1);
		assert_eq!(Opcode::GetRepayPart.as_u8(), 7);
		assert_eq!(Opcode::AddCollateral.as_u8(), 10);
		assert_eq!(Opcode::VaultDeposit.as_u8(), 20);
		assert_eq!(Opcode::VaultSetApproval.as_u8(), 24);
		assert_eq!(Opcode::Call.as_u8(), 30);
	}

	#[test]
	fn accrual_family_split() {
		assert!(Opcode::Borrow.requires_accrual());
		assert!(Opcode::GetRepayShare.requires_accrual());
		assert!(!Opcode::AddCollateral.requires_accrual());
		assert!(!Opcode::VaultDeposit.requires_accrual());
		assert!(!Opcode::Call.requires_accrual());
		assert!(Opcode::VaultTransfer.is_vault_op());
		assert!(!Opcode::Call.is_vault_op());
	}

	#[test]
	fn cook_args_stay_aligned() {
		let mut batch = ActionBatch::new();
		batch.push(Action::new(Opcode::VaultDeposit, Bytes::from(vec![1u8; 128])));
		batch.push(
			Action::new(Opcode::AddCollateral, Bytes::from(vec![2u8; 96]))
				.with_native_value(U256::from(7u64)),
		);
		assert_eq!(batch.len(), 2);
		assert_eq!(batch.total_native_value(), U256::from(7u64));

		let (opcodes, values, payloads) = batch.into_cook_args();
		assert_eq!(opcodes.len(), values.len());
		assert_eq!(values.len(), payloads.len());
		assert_eq!(opcodes, vec![20, 10]);
		assert_eq!(values, vec![U256::ZERO, U256::from(7u64)]);
	}
}
