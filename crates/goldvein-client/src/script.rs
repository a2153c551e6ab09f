//! Deferred command scripts.
//!
//! A script captures an ordered list of pair operations, possibly against
//! several handles and identities, without executing anything, then runs
//! them strictly in capture order. Sequencing matters across batches:
//! step N+1 may depend on state step N created, so the runner never issues
//! a step before the previous step's submission is confirmed. (Within one
//! batch, ordering and atomicity are the settlement contract's own
//! guarantee.)

use std::future::Future;

use alloy_primitives::{Address, U256};
use futures::future::BoxFuture;
use goldvein_encoding::ExternalCallPayload;
use goldvein_signing::Identity;
use goldvein_types::CallTarget;

use crate::{ClientError, PairHandle, ScriptAbortError};

/// One deferred pair operation.
///
/// A closed enumeration, resolved when the script is built; [`RawCall`]
/// covers arbitrary external calls.
///
/// [`RawCall`]: PairOperation::RawCall
#[derive(Debug, Clone)]
pub enum PairOperation {
	DepositCollateral { amount: U256 },
	WithdrawCollateral { share: U256 },
	DepositAsset { amount: U256 },
	DepositAssetWithApproval { amount: U256, operator: Address, nonce: U256 },
	WithdrawAsset { fraction: U256 },
	Repay { part: U256 },
	RepayFromVault { part: U256 },
	Borrow { amount: U256 },
	Short { swapper: CallTarget, amount: U256, min_returned_share: U256 },
	Unwind { swapper: CallTarget, part: U256, max_share: U256 },
	TokenPermit { token: Address, amount: U256, nonce: U256, deadline: U256 },
	ApproveAsset { amount: U256 },
	ApproveCollateral { amount: U256 },
	Accrue,
	UpdateExchangeRate,
	RawCall { payload: ExternalCallPayload },
}

type Thunk = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), ClientError>> + Send>;

enum Step {
	Operation {
		pair: PairHandle,
		operation: PairOperation,
		acting_as: Option<Identity>,
	},
	Thunk(Thunk),
}

/// Builder and runner for an ordered list of deferred steps.
///
/// Captures do not execute anything; [`CommandScript::run`] consumes the
/// list in order and awaits each submission's confirmation before
/// advancing. Execution is strictly sequential, never reordered or
/// parallelized.
#[derive(Default)]
pub struct CommandScript {
	steps: Vec<Step>,
	acting_as: Option<Identity>,
}

impl CommandScript {
	pub fn new() -> Self {
		Self::default()
	}

	/// Captures `operation` against `pair` under the current acting
	/// identity (the pair's own identity unless [`acting_as`] changed it).
	///
	/// [`acting_as`]: CommandScript::acting_as
	pub fn call(mut self, pair: &PairHandle, operation: PairOperation) -> Self {
		self.steps.push(Step::Operation {
			pair: pair.clone(),
			operation,
			acting_as: self.acting_as.clone(),
		});
		self
	}

	/// Captures one operation under an explicit identity, ignoring the
	/// sticky one.
	pub fn call_as(
		mut self,
		pair: &PairHandle,
		identity: &Identity,
		operation: PairOperation,
	) -> Self {
		self.steps.push(Step::Operation {
			pair: pair.clone(),
			operation,
			acting_as: Some(identity.clone()),
		});
		self
	}

	/// Rewraps subsequent captures under `identity`.
	pub fn acting_as(mut self, identity: &Identity) -> Self {
		self.acting_as = Some(identity.clone());
		self
	}

	/// Restores each target handle's own identity for subsequent captures.
	pub fn acting_as_default(mut self) -> Self {
		self.acting_as = None;
		self
	}

	/// Interleaves an arbitrary async step, awaited in place between the
	/// surrounding on-chain steps.
	pub fn then<F, Fut>(mut self, thunk: F) -> Self
	where
		F: FnOnce() -> Fut + Send + 'static,
		Fut: Future<Output = Result<(), ClientError>> + Send + 'static,
	{
		self.steps.push(Step::Thunk(Box::new(move || Box::pin(thunk()))));
		self
	}

	/// Number of captured steps.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Whether no steps were captured.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Runs every step in order.
	///
	/// Each on-chain step's submission is confirmed before the next step is
	/// issued. The first failure aborts the remainder and carries the
	/// failing step's index.
	pub async fn run(self) -> Result<(), ScriptAbortError> {
		for (step, entry) in self.steps.into_iter().enumerate() {
			let result = match entry {
				Step::Operation {
					pair,
					operation,
					acting_as,
				} => {
					let pair = match acting_as {
						Some(identity) => pair.with_identity(identity),
						None => pair,
					};
					tracing::debug!(step, "running script step");
					execute(&pair, operation).await
				}
				Step::Thunk(thunk) => thunk().await,
			};
			if let Err(source) = result {
				return Err(ScriptAbortError { step, source });
			}
		}
		Ok(())
	}
}

async fn execute(pair: &PairHandle, operation: PairOperation) -> Result<(), ClientError> {
	let submission = match operation {
		PairOperation::DepositCollateral { amount } => pair.deposit_collateral(amount).await?,
		PairOperation::WithdrawCollateral { share } => pair.withdraw_collateral(share).await?,
		PairOperation::DepositAsset { amount } => pair.deposit_asset(amount).await?,
		PairOperation::DepositAssetWithApproval {
			amount,
			operator,
			nonce,
		} => pair.deposit_asset_with_approval(amount, operator, nonce).await?,
		PairOperation::WithdrawAsset { fraction } => pair.withdraw_asset(fraction).await?,
		PairOperation::Repay { part } => pair.repay(part).await?,
		PairOperation::RepayFromVault { part } => pair.repay_from_vault(part).await?,
		PairOperation::Borrow { amount } => pair.borrow(amount).await?,
		PairOperation::Short {
			swapper,
			amount,
			min_returned_share,
		} => pair.short(swapper, amount, min_returned_share).await?,
		PairOperation::Unwind {
			swapper,
			part,
			max_share,
		} => pair.unwind(swapper, part, max_share).await?,
		PairOperation::TokenPermit {
			token,
			amount,
			nonce,
			deadline,
		} => pair.token_permit(token, amount, nonce, deadline).await?,
		PairOperation::ApproveAsset { amount } => pair.approve_asset(amount).await?,
		PairOperation::ApproveCollateral { amount } => pair.approve_collateral(amount).await?,
		PairOperation::Accrue => pair.accrue().await?,
		PairOperation::UpdateExchangeRate => pair.update_exchange_rate().await?,
		PairOperation::RawCall { payload } => pair.raw_call(payload).await?,
	};
	submission.confirmed().await?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::MockTransport;
	use crate::SubmissionError;
	use std::sync::Arc;

	fn pair(transport: Arc<MockTransport>, identity: Identity) -> PairHandle {
		PairHandle::bind(
			transport,
			Address::repeat_byte(0x10),
			Address::repeat_byte(0xb0),
			Address::repeat_byte(0xa1),
			Address::repeat_byte(0xc1),
			identity,
			1,
		)
	}

	#[tokio::test]
	async fn steps_run_in_order_and_wait_for_confirmation() {
		let transport = Arc::new(MockTransport::new());
		let alice = Identity::random();
		let bob = Identity::random();
		let handle = pair(transport.clone(), alice.clone());

		CommandScript::new()
			.call(&handle, PairOperation::DepositAsset { amount: U256::from(100u64) })
			.acting_as(&bob)
			.call(&handle, PairOperation::DepositCollateral { amount: U256::from(50u64) })
			.acting_as_default()
			.call(&handle, PairOperation::Borrow { amount: U256::from(10u64) })
			.run()
			.await
			.unwrap();

		// Step N+1 is never submitted before step N's confirmation.
		let events = transport.events.lock().unwrap();
		assert_eq!(
			*events,
			vec!["submit:0", "confirm:0", "submit:1", "confirm:1", "submit:2", "confirm:2"]
		);

		// The sticky identity applies to the middle step only.
		let transactions = transport.transactions.lock().unwrap();
		assert_eq!(transactions[0].from, alice.address());
		assert_eq!(transactions[1].from, bob.address());
		assert_eq!(transactions[2].from, alice.address());
	}

	#[tokio::test]
	async fn a_reverted_step_aborts_the_remainder_with_its_index() {
		let transport = Arc::new(MockTransport::new());
		transport.revert_at(1);
		let handle = pair(transport.clone(), Identity::random());

		let err = CommandScript::new()
			.call(&handle, PairOperation::Accrue)
			.call(&handle, PairOperation::Borrow { amount: U256::from(10u64) })
			.call(&handle, PairOperation::UpdateExchangeRate)
			.run()
			.await
			.unwrap_err();

		assert_eq!(err.step, 1);
		assert!(matches!(
			err.source,
			ClientError::Submission(SubmissionError::Reverted(_))
		));

		// The third step never reached the transport.
		assert_eq!(transport.transactions.lock().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn thunks_are_awaited_in_place() {
		let transport = Arc::new(MockTransport::new());
		let handle = pair(transport.clone(), Identity::random());
		let probe = transport.clone();

		CommandScript::new()
			.call(&handle, PairOperation::Accrue)
			.then(move || async move {
				probe.events.lock().unwrap().push("thunk".to_string());
				Ok(())
			})
			.call(&handle, PairOperation::UpdateExchangeRate)
			.run()
			.await
			.unwrap();

		let events = transport.events.lock().unwrap();
		assert_eq!(
			*events,
			vec!["submit:0", "confirm:0", "thunk", "submit:1", "confirm:1"]
		);
	}

	#[tokio::test]
	async fn a_failing_thunk_aborts_with_its_index() {
		let transport = Arc::new(MockTransport::new());
		let handle = pair(transport.clone(), Identity::random());

		let err = CommandScript::new()
			.call(&handle, PairOperation::Accrue)
			.then(|| async { Err(ClientError::Step("position not liquidated".to_string())) })
			.call(&handle, PairOperation::Accrue)
			.run()
			.await
			.unwrap_err();

		assert_eq!(err.step, 1);
		assert!(matches!(err.source, ClientError::Step(_)));
		assert_eq!(transport.transactions.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn per_step_identity_overrides_the_sticky_one() {
		let transport = Arc::new(MockTransport::new());
		let alice = Identity::random();
		let bob = Identity::random();
		let carol = Identity::random();
		let handle = pair(transport.clone(), alice);

		CommandScript::new()
			.acting_as(&bob)
			.call_as(&handle, &carol, PairOperation::Accrue)
			.call(&handle, PairOperation::Accrue)
			.run()
			.await
			.unwrap();

		let transactions = transport.transactions.lock().unwrap();
		assert_eq!(transactions[0].from, carol.address());
		assert_eq!(transactions[1].from, bob.address());
	}
}
