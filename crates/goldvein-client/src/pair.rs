//! Handles for deployed lending pairs.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent};
use goldvein_encoding::abi::{IAlpineVault, IERC20, IGoldVeinPair};
use goldvein_encoding::{pair_init_data, ActionEncoder, ExternalCallPayload};
use goldvein_signing::{AuthorizationMessage, Identity, TypedDataSigner};
use goldvein_types::{
	ActionBatch, CallTarget, Signature, Transaction, TransactionReceipt,
};

use crate::{ClientError, Submission, SubmissionError, Transport};

/// A lending pair bound to one signing identity.
///
/// The binding (pair contract, companion vault, resolved asset and
/// collateral tokens, identity) is immutable after construction;
/// [`PairHandle::with_identity`] produces a new handle instead of mutating.
/// Every semantic operation compiles to one atomic `cook` batch and returns
/// the pending [`Submission`].
#[derive(Clone)]
pub struct PairHandle {
	contract: Address,
	vault: Address,
	asset: Address,
	collateral: Address,
	identity: Identity,
	encoder: ActionEncoder,
	typed_data: TypedDataSigner,
	transport: Arc<dyn Transport>,
}

impl PairHandle {
	/// Binds a handle with already-known token addresses. No network
	/// access.
	pub fn bind(
		transport: Arc<dyn Transport>,
		contract: Address,
		vault: Address,
		asset: Address,
		collateral: Address,
		identity: Identity,
		chain_id: u64,
	) -> Self {
		let encoder = ActionEncoder::new(asset, collateral, vault, identity.address());
		Self {
			contract,
			vault,
			asset,
			collateral,
			identity,
			encoder,
			typed_data: TypedDataSigner::new(chain_id),
			transport,
		}
	}

	/// Binds to an already-deployed pair, resolving its asset and
	/// collateral token addresses on-chain.
	pub async fn attach(
		transport: Arc<dyn Transport>,
		contract: Address,
		vault: Address,
		identity: Identity,
		chain_id: u64,
	) -> Result<Self, ClientError> {
		let asset_return = transport
			.call(contract, IGoldVeinPair::assetCall {}.abi_encode().into())
			.await?;
		let asset = IGoldVeinPair::assetCall::abi_decode_returns(&asset_return, true)
			.map_err(|e| SubmissionError::Network(format!("malformed asset() return: {}", e)))?
			._0;

		let collateral_return = transport
			.call(contract, IGoldVeinPair::collateralCall {}.abi_encode().into())
			.await?;
		let collateral = IGoldVeinPair::collateralCall::abi_decode_returns(&collateral_return, true)
			.map_err(|e| SubmissionError::Network(format!("malformed collateral() return: {}", e)))?
			._0;

		Ok(Self::bind(transport, contract, vault, asset, collateral, identity, chain_id))
	}

	/// Deploys a new pair clone through the vault and returns a handle
	/// bound to it.
	///
	/// Submits the clone-initialization payload, waits for the vault's
	/// `LogDeploy` event, re-attaches at the emitted clone address, and
	/// triggers an initial exchange-rate refresh.
	#[allow(clippy::too_many_arguments)]
	pub async fn deploy(
		transport: Arc<dyn Transport>,
		vault: Address,
		master_contract: Address,
		asset: Address,
		collateral: Address,
		oracle: Address,
		oracle_data: Bytes,
		identity: Identity,
		chain_id: u64,
	) -> Result<Self, ClientError> {
		let init_data = pair_init_data(asset, collateral, oracle, oracle_data);
		let data = IAlpineVault::deployCall {
			masterContract: master_contract,
			data: init_data,
			useCreate2: true,
		}
		.abi_encode();

		let tx = Transaction {
			from: identity.address(),
			to: vault,
			value: U256::ZERO,
			data: data.into(),
		};
		let hash = transport.submit(tx).await?;
		let receipt = Submission::new(hash, Arc::clone(&transport)).confirmed().await?;
		let clone_address = extract_clone_address(&receipt, vault)?;
		tracing::info!(pair = %clone_address, "deployed lending pair clone");

		let handle = Self::bind(transport, clone_address, vault, asset, collateral, identity, chain_id);
		handle.update_exchange_rate().await?.confirmed().await?;
		Ok(handle)
	}

	/// Returns a new handle sharing every address but bound to `identity`.
	pub fn with_identity(&self, identity: Identity) -> Self {
		let mut handle = self.clone();
		handle.encoder =
			ActionEncoder::new(self.asset, self.collateral, self.vault, identity.address());
		handle.identity = identity;
		handle
	}

	/// Address of the pair contract.
	pub fn address(&self) -> Address {
		self.contract
	}

	/// Address of the companion vault.
	pub fn vault(&self) -> Address {
		self.vault
	}

	/// Address of the asset token.
	pub fn asset(&self) -> Address {
		self.asset
	}

	/// Address of the collateral token.
	pub fn collateral(&self) -> Address {
		self.collateral
	}

	/// The identity this handle signs and acts as.
	pub fn identity(&self) -> &Identity {
		&self.identity
	}

	// Semantic operations. Each compiles one batch and submits it.

	/// Deposits collateral tokens and credits them to the position.
	pub async fn deposit_collateral(&self, amount: U256) -> Result<Submission, ClientError> {
		self.cook(self.encoder.deposit_collateral(amount)?).await
	}

	/// Withdraws collateral shares out of the vault.
	pub async fn withdraw_collateral(&self, share: U256) -> Result<Submission, ClientError> {
		self.cook(self.encoder.withdraw_collateral(share)?).await
	}

	/// Deposits asset tokens into the lending position.
	pub async fn deposit_asset(&self, amount: U256) -> Result<Submission, ClientError> {
		self.cook(self.encoder.deposit_asset(amount)?).await
	}

	/// Deposits asset tokens, installing a vault operator approval for
	/// `operator` in the same batch. `nonce` is the identity's current
	/// approval nonce on the vault.
	pub async fn deposit_asset_with_approval(
		&self,
		amount: U256,
		operator: Address,
		nonce: U256,
	) -> Result<Submission, ClientError> {
		let signature = self.sign_vault_operator_approval(operator, true, nonce)?;
		self.cook(self.encoder.deposit_asset_with_approval(amount, operator, &signature)?)
			.await
	}

	/// Withdraws a fraction of the lending position.
	pub async fn withdraw_asset(&self, fraction: U256) -> Result<Submission, ClientError> {
		self.cook(self.encoder.withdraw_asset(fraction)?).await
	}

	/// Repays `part` of the open borrow from token balance.
	pub async fn repay(&self, part: U256) -> Result<Submission, ClientError> {
		self.cook(self.encoder.repay(part)?).await
	}

	/// Repays `part` directly from the identity's vault balance.
	pub async fn repay_from_vault(&self, part: U256) -> Result<Submission, ClientError> {
		let data = IGoldVeinPair::repayCall {
			to: self.identity.address(),
			skim: false,
			part,
		}
		.abi_encode();
		self.submit(self.contract, U256::ZERO, data).await
	}

	/// Borrows `amount` of asset against posted collateral.
	pub async fn borrow(&self, amount: U256) -> Result<Submission, ClientError> {
		self.cook(self.encoder.borrow(amount)?).await
	}

	/// Leverage open through `swapper`.
	pub async fn short(
		&self,
		swapper: CallTarget,
		amount: U256,
		min_returned_share: U256,
	) -> Result<Submission, ClientError> {
		self.cook(self.encoder.short(swapper, amount, min_returned_share)?).await
	}

	/// Leverage close through `swapper`.
	pub async fn unwind(
		&self,
		swapper: CallTarget,
		part: U256,
		max_share: U256,
	) -> Result<Submission, ClientError> {
		self.cook(self.encoder.unwind(swapper, part, max_share)?).await
	}

	/// Delivers a permit for `token` to the vault through the batch. The
	/// permit is signed by this handle's identity; `nonce` is the owner's
	/// current permit nonce on the token.
	pub async fn token_permit(
		&self,
		token: Address,
		amount: U256,
		nonce: U256,
		deadline: U256,
	) -> Result<Submission, ClientError> {
		let owner = self.identity.address();
		let message = AuthorizationMessage::TokenPermit {
			owner,
			spender: self.vault,
			value: amount,
			nonce,
			deadline,
		};
		let signature = self.typed_data.sign(token, &message, &self.identity)?;
		self.cook(self.encoder.token_permit(token, owner, amount, deadline, &signature))
			.await
	}

	/// Submits a single generic external call through the batch.
	pub async fn raw_call(&self, payload: ExternalCallPayload) -> Result<Submission, ClientError> {
		self.cook(self.encoder.external_call(payload)).await
	}

	/// Approves the vault to pull asset tokens.
	pub async fn approve_asset(&self, amount: U256) -> Result<Submission, ClientError> {
		self.approve(self.asset, amount).await
	}

	/// Approves the vault to pull collateral tokens.
	pub async fn approve_collateral(&self, amount: U256) -> Result<Submission, ClientError> {
		self.approve(self.collateral, amount).await
	}

	/// Triggers interest accrual on the pair.
	pub async fn accrue(&self) -> Result<Submission, ClientError> {
		self.submit(self.contract, U256::ZERO, IGoldVeinPair::accrueCall {}.abi_encode())
			.await
	}

	/// Triggers an exchange-rate refresh on the pair.
	pub async fn update_exchange_rate(&self) -> Result<Submission, ClientError> {
		self.submit(
			self.contract,
			U256::ZERO,
			IGoldVeinPair::updateExchangeRateCall {}.abi_encode(),
		)
		.await
	}

	/// Signs a vault operator approval for out-of-band delivery.
	pub fn sign_vault_operator_approval(
		&self,
		operator: Address,
		approved: bool,
		nonce: U256,
	) -> Result<Signature, ClientError> {
		let message = AuthorizationMessage::VaultOperatorApproval {
			user: self.identity.address(),
			operator_contract: operator,
			approved,
			nonce,
		};
		Ok(self.typed_data.sign(self.vault, &message, &self.identity)?)
	}

	async fn approve(&self, token: Address, amount: U256) -> Result<Submission, ClientError> {
		let data = IERC20::approveCall {
			spender: self.vault,
			amount,
		}
		.abi_encode();
		self.submit(token, U256::ZERO, data).await
	}

	async fn cook(&self, batch: ActionBatch) -> Result<Submission, ClientError> {
		let value = batch.total_native_value();
		let (actions, values, datas) = batch.into_cook_args();
		tracing::debug!(
			pair = %self.contract,
			actions = actions.len(),
			"submitting action batch"
		);
		let data = IGoldVeinPair::cookCall {
			actions,
			values,
			datas,
		}
		.abi_encode();
		self.submit(self.contract, value, data).await
	}

	async fn submit(
		&self,
		to: Address,
		value: U256,
		data: Vec<u8>,
	) -> Result<Submission, ClientError> {
		let tx = Transaction {
			from: self.identity.address(),
			to,
			value,
			data: data.into(),
		};
		let hash = self.transport.submit(tx).await?;
		Ok(Submission::new(hash, Arc::clone(&self.transport)))
	}
}

impl fmt::Debug for PairHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PairHandle")
			.field("contract", &self.contract)
			.field("vault", &self.vault)
			.field("asset", &self.asset)
			.field("collateral", &self.collateral)
			.field("identity", &self.identity.address())
			.finish()
	}
}

impl From<&PairHandle> for CallTarget {
	fn from(handle: &PairHandle) -> Self {
		CallTarget::Handle(handle.address())
	}
}

fn extract_clone_address(
	receipt: &TransactionReceipt,
	vault: Address,
) -> Result<Address, SubmissionError> {
	receipt
		.logs
		.iter()
		.find(|log| {
			log.address == vault
				&& log.topics.first() == Some(&IAlpineVault::LogDeploy::SIGNATURE_HASH)
		})
		.and_then(|log| log.topics.get(2))
		.map(|topic| Address::from_slice(&topic[12..]))
		.ok_or_else(|| SubmissionError::MissingEvent("LogDeploy".to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::MockTransport;
	use alloy_primitives::B256;
	use alloy_sol_types::SolValue;
	use goldvein_types::Opcode;

	fn handle(transport: Arc<MockTransport>) -> (PairHandle, Identity) {
		let identity = Identity::random();
		let pair = PairHandle::bind(
			transport,
			Address::repeat_byte(0x10),
			Address::repeat_byte(0xb0),
			Address::repeat_byte(0xa1),
			Address::repeat_byte(0xc1),
			identity.clone(),
			1,
		);
		(pair, identity)
	}

	#[tokio::test]
	async fn deposit_asset_submits_one_cook_batch() {
		let transport = Arc::new(MockTransport::new());
		let (pair, identity) = handle(transport.clone());

		pair.deposit_asset(U256::from(1000u64)).await.unwrap();

		let transactions = transport.transactions.lock().unwrap();
		assert_eq!(transactions.len(), 1);
		assert_eq!(transactions[0].to, Address::repeat_byte(0x10));
		assert_eq!(transactions[0].from, identity.address());

		let call = IGoldVeinPair::cookCall::abi_decode(&transactions[0].data, true).unwrap();
		assert_eq!(call.actions, vec![Opcode::VaultDeposit.as_u8(), Opcode::AddAsset.as_u8()]);
		assert_eq!(call.values, vec![U256::ZERO, U256::ZERO]);
		assert_eq!(call.datas.len(), 2);
	}

	#[tokio::test]
	async fn attach_resolves_token_addresses() {
		let transport = Arc::new(MockTransport::new());
		transport.set_view_return(
			IGoldVeinPair::assetCall::SELECTOR,
			Address::repeat_byte(0xa1).abi_encode(),
		);
		transport.set_view_return(
			IGoldVeinPair::collateralCall::SELECTOR,
			Address::repeat_byte(0xc1).abi_encode(),
		);

		let pair = PairHandle::attach(
			transport.clone(),
			Address::repeat_byte(0x10),
			Address::repeat_byte(0xb0),
			Identity::random(),
			1,
		)
		.await
		.unwrap();

		assert_eq!(pair.asset(), Address::repeat_byte(0xa1));
		assert_eq!(pair.collateral(), Address::repeat_byte(0xc1));
		assert!(transport.transactions.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn with_identity_rebinds_without_mutating() {
		let transport = Arc::new(MockTransport::new());
		let (pair, original) = handle(transport.clone());
		let other = Identity::random();

		let rebound = pair.with_identity(other.clone());
		assert_eq!(pair.identity().address(), original.address());
		assert_eq!(rebound.identity().address(), other.address());
		assert_eq!(rebound.address(), pair.address());
		assert_eq!(rebound.asset(), pair.asset());

		rebound.borrow(U256::from(5u64)).await.unwrap();
		let transactions = transport.transactions.lock().unwrap();
		assert_eq!(transactions[0].from, other.address());
	}

	#[tokio::test]
	async fn approvals_and_direct_calls_target_the_right_contracts() {
		let transport = Arc::new(MockTransport::new());
		let (pair, identity) = handle(transport.clone());

		pair.approve_asset(U256::from(10u64)).await.unwrap();
		pair.approve_collateral(U256::from(20u64)).await.unwrap();
		pair.repay_from_vault(U256::from(3u64)).await.unwrap();
		pair.accrue().await.unwrap();

		let transactions = transport.transactions.lock().unwrap();
		assert_eq!(transactions[0].to, pair.asset());
		let approve = IERC20::approveCall::abi_decode(&transactions[0].data, true).unwrap();
		assert_eq!(approve.spender, pair.vault());
		assert_eq!(approve.amount, U256::from(10u64));

		assert_eq!(transactions[1].to, pair.collateral());

		assert_eq!(transactions[2].to, pair.address());
		let repay = IGoldVeinPair::repayCall::abi_decode(&transactions[2].data, true).unwrap();
		assert_eq!(repay.to, identity.address());
		assert!(!repay.skim);
		assert_eq!(repay.part, U256::from(3u64));

		assert_eq!(&transactions[3].data[..4], IGoldVeinPair::accrueCall::SELECTOR.as_slice());
	}

	#[tokio::test]
	async fn permit_signature_embeds_the_identity_as_owner() {
		let transport = Arc::new(MockTransport::new());
		let (pair, identity) = handle(transport.clone());
		let token = Address::repeat_byte(0x99);

		pair.token_permit(token, U256::from(50u64), U256::ZERO, U256::from(9_999u64))
			.await
			.unwrap();

		let transactions = transport.transactions.lock().unwrap();
		let call = IGoldVeinPair::cookCall::abi_decode(&transactions[0].data, true).unwrap();
		assert_eq!(call.actions, vec![Opcode::Call.as_u8()]);

		let (target, data, _use_amount, _use_share, _words) =
			<(Address, alloy_primitives::Bytes, bool, bool, U256)>::abi_decode_params(
				&call.datas[0],
				true,
			)
			.unwrap();
		assert_eq!(target, token);
		let permit = IERC20::permitCall::abi_decode(&data, true).unwrap();
		assert_eq!(permit.owner_, identity.address());
		assert_eq!(permit.spender, pair.vault());
		assert!(permit.v == 27 || permit.v == 28);
	}

	#[tokio::test]
	async fn deploy_attaches_at_the_emitted_clone_address() {
		let transport = Arc::new(MockTransport::new());
		let identity = Identity::random();
		let vault = Address::repeat_byte(0xb0);
		let clone = Address::repeat_byte(0x42);

		let mut clone_topic = [0u8; 32];
		clone_topic[12..].copy_from_slice(clone.as_slice());
		transport.set_receipt_logs(
			0,
			vec![goldvein_types::LogEntry {
				address: vault,
				topics: vec![
					IAlpineVault::LogDeploy::SIGNATURE_HASH,
					B256::ZERO,
					B256::from(clone_topic),
				],
				data: alloy_primitives::Bytes::new(),
			}],
		);

		let pair = PairHandle::deploy(
			transport.clone(),
			vault,
			Address::repeat_byte(0x77),
			Address::repeat_byte(0xa1),
			Address::repeat_byte(0xc1),
			Address::repeat_byte(0x0c),
			alloy_primitives::Bytes::from(vec![1, 2]),
			identity,
			1,
		)
		.await
		.unwrap();

		assert_eq!(pair.address(), clone);

		let transactions = transport.transactions.lock().unwrap();
		assert_eq!(transactions.len(), 2);
		assert_eq!(transactions[0].to, vault);
		let deploy = IAlpineVault::deployCall::abi_decode(&transactions[0].data, true).unwrap();
		assert_eq!(deploy.masterContract, Address::repeat_byte(0x77));
		assert!(deploy.useCreate2);
		// The bootstrap ends with an exchange-rate refresh on the clone.
		assert_eq!(transactions[1].to, clone);
		assert_eq!(
			&transactions[1].data[..4],
			IGoldVeinPair::updateExchangeRateCall::SELECTOR.as_slice()
		);
	}

	#[tokio::test]
	async fn deploy_without_the_event_is_an_error() {
		let transport = Arc::new(MockTransport::new());
		let err = PairHandle::deploy(
			transport,
			Address::repeat_byte(0xb0),
			Address::repeat_byte(0x77),
			Address::repeat_byte(0xa1),
			Address::repeat_byte(0xc1),
			Address::repeat_byte(0x0c),
			alloy_primitives::Bytes::new(),
			Identity::random(),
			1,
		)
		.await
		.unwrap_err();
		assert!(matches!(
			err,
			ClientError::Submission(SubmissionError::MissingEvent(_))
		));
	}
}
