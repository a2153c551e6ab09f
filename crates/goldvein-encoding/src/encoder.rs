//! Compilation of semantic operations into action batches.

use alloy_primitives::{Address, Bytes, I256, U256};
use alloy_sol_types::{SolCall, SolValue};
use goldvein_types::{
	Action, ActionBatch, CallTarget, Opcode, Signature, EXACT_PRECEDING, FULL_PRECEDING,
};

use crate::abi::{IERC20, ISwapper};
use crate::{EncodingError, ExternalCallPayload};

/// Compiles semantic lending operations into ordered action batches.
///
/// Holds only the pair's token/vault bindings and the acting identity; all
/// methods are pure. Action order within each batch is load-bearing: later
/// actions consume the running results of earlier ones through the
/// [`FULL_PRECEDING`] and [`EXACT_PRECEDING`] sentinels, and the receiving
/// contract executes strictly in listed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEncoder {
	asset: Address,
	collateral: Address,
	vault: Address,
	identity: Address,
}

impl ActionEncoder {
	/// Binds an encoder to a pair's tokens, its companion vault, and the
	/// acting identity.
	pub fn new(asset: Address, collateral: Address, vault: Address, identity: Address) -> Self {
		Self {
			asset,
			collateral,
			vault,
			identity,
		}
	}

	/// The identity whose balances the encoded operations move.
	pub fn identity(&self) -> Address {
		self.identity
	}

	/// Deposit collateral tokens: vault deposit, then credit exactly the
	/// deposited amount as collateral.
	pub fn deposit_collateral(&self, amount: U256) -> Result<ActionBatch, EncodingError> {
		let amount = to_i256(amount)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(
				Opcode::VaultDeposit,
				vault_balance_payload(self.collateral, self.identity, amount, I256::ZERO),
			),
			Action::new(
				Opcode::AddCollateral,
				adjust_payload(EXACT_PRECEDING, self.identity, false),
			),
		]))
	}

	/// Withdraw collateral shares: release them, then pull the same share
	/// count out of the vault.
	pub fn withdraw_collateral(&self, share: U256) -> Result<ActionBatch, EncodingError> {
		let share = to_i256(share)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(
				Opcode::RemoveCollateral,
				remove_payload(share, self.identity),
			),
			Action::new(
				Opcode::VaultWithdraw,
				vault_balance_payload(self.collateral, self.identity, I256::ZERO, share),
			),
		]))
	}

	/// Deposit asset tokens: vault deposit, then credit exactly the
	/// deposited amount to the lending position.
	pub fn deposit_asset(&self, amount: U256) -> Result<ActionBatch, EncodingError> {
		let amount = to_i256(amount)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(
				Opcode::VaultDeposit,
				vault_balance_payload(self.asset, self.identity, amount, I256::ZERO),
			),
			Action::new(
				Opcode::AddAsset,
				adjust_payload(EXACT_PRECEDING, self.identity, false),
			),
		]))
	}

	/// Deposit asset tokens, first installing the caller-signed vault
	/// operator approval inside the same batch.
	pub fn deposit_asset_with_approval(
		&self,
		amount: U256,
		operator: Address,
		signature: &Signature,
	) -> Result<ActionBatch, EncodingError> {
		let amount = to_i256(amount)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(
				Opcode::VaultSetApproval,
				set_approval_payload(self.identity, operator, true, signature),
			),
			Action::new(
				Opcode::VaultDeposit,
				vault_balance_payload(self.asset, self.identity, amount, I256::ZERO),
			),
			Action::new(
				Opcode::AddAsset,
				adjust_payload(EXACT_PRECEDING, self.identity, false),
			),
		]))
	}

	/// Withdraw a fraction of the lending position, pulling everything the
	/// removal produced out of the vault.
	pub fn withdraw_asset(&self, fraction: U256) -> Result<ActionBatch, EncodingError> {
		let fraction = to_i256(fraction)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(Opcode::RemoveAsset, remove_payload(fraction, self.identity)),
			Action::new(
				Opcode::VaultWithdraw,
				vault_balance_payload(self.asset, self.identity, I256::ZERO, FULL_PRECEDING),
			),
		]))
	}

	/// Repay borrowed parts: convert the part count to its current share
	/// cost, deposit exactly that into the vault, then repay.
	pub fn repay(&self, part: U256) -> Result<ActionBatch, EncodingError> {
		let part = to_i256(part)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(Opcode::GetRepayShare, part_payload(part)),
			Action::new(
				Opcode::VaultDeposit,
				vault_balance_payload(self.asset, self.identity, I256::ZERO, FULL_PRECEDING),
			),
			Action::new(Opcode::Repay, adjust_payload(part, self.identity, false)),
		]))
	}

	/// Borrow against collateral and withdraw exactly the borrowed shares
	/// from the vault.
	pub fn borrow(&self, amount: U256) -> Result<ActionBatch, EncodingError> {
		let amount = to_i256(amount)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(Opcode::Borrow, remove_payload(amount, self.identity)),
			Action::new(
				Opcode::VaultWithdraw,
				vault_balance_payload(self.asset, self.identity, I256::ZERO, EXACT_PRECEDING),
			),
		]))
	}

	/// Leverage open: borrow asset, hand it to the swapper, swap for
	/// collateral, and post the swap proceeds as collateral.
	///
	/// The swap's final `shareFrom` argument is left to the contract, which
	/// injects the exact share count the vault transfer produced.
	pub fn short(
		&self,
		swapper: CallTarget,
		amount: U256,
		min_returned_share: U256,
	) -> Result<ActionBatch, EncodingError> {
		let swapper = swapper.resolve();
		let amount = to_i256(amount)?;
		let swap_data = ISwapper::swapCall {
			fromToken: self.asset,
			toToken: self.collateral,
			recipient: self.identity,
			shareToMin: min_returned_share,
			// Placeholder for the injected share count; stripped below.
			shareFrom: U256::ZERO,
		}
		.abi_encode();
		let call = ExternalCallPayload::with_share_result(swapper, swap_data, 2)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(Opcode::Borrow, remove_payload(amount, self.identity)),
			Action::new(
				Opcode::VaultTransfer,
				vault_transfer_payload(self.asset, swapper, EXACT_PRECEDING),
			),
			Action::new(Opcode::Call, call.encode()),
			Action::new(
				Opcode::AddCollateral,
				adjust_payload(EXACT_PRECEDING, self.identity, false),
			),
		]))
	}

	/// Leverage close: release up to `max_share` collateral to the swapper,
	/// swap just enough of it back into asset to cover `part`, repay, and
	/// re-post whatever collateral the swapper did not consume.
	///
	/// The swap's final `shareToExact` argument is injected by the contract
	/// from the repay-share conversion immediately before the call.
	pub fn unwind(
		&self,
		swapper: CallTarget,
		part: U256,
		max_share: U256,
	) -> Result<ActionBatch, EncodingError> {
		let swapper = swapper.resolve();
		let part = to_i256(part)?;
		let max_share_signed = to_i256(max_share)?;
		let swap_data = ISwapper::swapExactCall {
			fromToken: self.collateral,
			toToken: self.asset,
			recipient: self.identity,
			refundTo: self.identity,
			shareFromSupplied: max_share,
			// Placeholder for the injected repay share; stripped below.
			shareToExact: U256::ZERO,
		}
		.abi_encode();
		let call = ExternalCallPayload::with_amount_result(swapper, swap_data, 2)?;
		Ok(ActionBatch::from_actions(vec![
			Action::new(Opcode::RemoveCollateral, remove_payload(max_share_signed, swapper)),
			Action::new(Opcode::GetRepayShare, part_payload(part)),
			Action::new(Opcode::Call, call.encode()),
			Action::new(Opcode::Repay, adjust_payload(part, self.identity, false)),
			Action::new(
				Opcode::AddCollateral,
				adjust_payload(EXACT_PRECEDING, self.identity, false),
			),
		]))
	}

	/// A token permit delivered through the batch: one external call to the
	/// token carrying the owner's permit signature for the vault.
	pub fn token_permit(
		&self,
		token: Address,
		owner: Address,
		value: U256,
		deadline: U256,
		signature: &Signature,
	) -> ActionBatch {
		let permit_data = IERC20::permitCall {
			owner_: owner,
			spender: self.vault,
			value,
			deadline,
			v: signature.v,
			r: signature.r,
			s: signature.s,
		}
		.abi_encode();
		self.external_call(ExternalCallPayload::plain(token, permit_data))
	}

	/// A single generic external call wrapped as a batch.
	pub fn external_call(&self, payload: ExternalCallPayload) -> ActionBatch {
		ActionBatch::from_actions(vec![Action::new(Opcode::Call, payload.encode())])
	}
}

/// Initialization payload for deploying a pair clone through the vault:
/// `(asset, collateral, oracle, oracleData)`.
pub fn pair_init_data(
	asset: Address,
	collateral: Address,
	oracle: Address,
	oracle_data: Bytes,
) -> Bytes {
	(asset, collateral, oracle, oracle_data).abi_encode_params().into()
}

fn to_i256(value: U256) -> Result<I256, EncodingError> {
	I256::try_from(value).map_err(|_| EncodingError::ValueOutOfRange(value.to_string()))
}

// Payload layouts, fixed by the settlement contract's decode side.

/// `(address token, address to, int256 amount, int256 share)` for vault
/// deposit and withdraw.
fn vault_balance_payload(token: Address, to: Address, amount: I256, share: I256) -> Bytes {
	(token, to, amount, share).abi_encode_params().into()
}

/// `(address token, address to, int256 share)` for vault transfer.
fn vault_transfer_payload(token: Address, to: Address, share: I256) -> Bytes {
	(token, to, share).abi_encode_params().into()
}

/// `(int256 value, address to, bool skim)` for add-asset, add-collateral,
/// and repay.
fn adjust_payload(value: I256, to: Address, skim: bool) -> Bytes {
	(value, to, skim).abi_encode_params().into()
}

/// `(int256 value, address to)` for remove-asset, remove-collateral, and
/// borrow.
fn remove_payload(value: I256, to: Address) -> Bytes {
	(value, to).abi_encode_params().into()
}

/// `(int256 part)` for the repay-share conversion.
fn part_payload(part: I256) -> Bytes {
	part.abi_encode().into()
}

/// `(address user, address operatorContract, bool approved, uint8 v,
/// bytes32 r, bytes32 s)` for the vault operator approval.
fn set_approval_payload(
	user: Address,
	operator: Address,
	approved: bool,
	signature: &Signature,
) -> Bytes {
	(
		user,
		operator,
		approved,
		U256::from(signature.v),
		signature.r,
		signature.s,
	)
		.abi_encode_params()
		.into()
}
