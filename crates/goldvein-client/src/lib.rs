//! Client orchestration for GoldVein lending pairs.
//!
//! This crate binds the pure encoding and signing layers to a chain
//! transport: [`PairHandle`] compiles semantic operations into atomic
//! `cook` batches and submits them, [`CommandScript`] sequences deferred,
//! possibly multi-identity call scripts, and [`Transport`] abstracts the
//! submission boundary with an alloy-backed HTTP implementation.
//!
//! Nothing here retries: a remote failure is fatal to the current call or
//! script, and a submission, once issued, cannot be withdrawn.

/// Pair handles and the deploy bootstrap.
pub mod pair;
/// Deferred command scripts.
pub mod script;
/// The chain submission boundary.
pub mod transport;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

#[cfg(test)]
pub(crate) mod testutil;

pub use implementations::http::HttpTransport;
pub use pair::PairHandle;
pub use script::{CommandScript, PairOperation};
pub use transport::{Submission, Transport};

use goldvein_encoding::EncodingError;
use goldvein_signing::SigningError;
use thiserror::Error;

/// Errors from the remote submission boundary.
#[derive(Debug, Error)]
pub enum SubmissionError {
	/// Transport-level failure reaching the network.
	#[error("network error: {0}")]
	Network(String),
	/// The remote node rejected the submission; the underlying reason is
	/// attached unmodified.
	#[error("submission rejected: {0}")]
	Rejected(String),
	/// The submission was mined but its execution failed.
	#[error("submission {0} reverted")]
	Reverted(String),
	/// Confirmation polling exceeded the configured timeout.
	#[error("timed out waiting for confirmation of {0}")]
	ConfirmationTimeout(String),
	/// A receipt was confirmed but lacked an expected event.
	#[error("expected event not found: {0}")]
	MissingEvent(String),
}

/// Any failure surfaced by a pair operation.
#[derive(Debug, Error)]
pub enum ClientError {
	/// Operation arguments could not be compiled into a batch.
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	/// An embedded authorization could not be signed.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// The submission boundary failed.
	#[error(transparent)]
	Submission(#[from] SubmissionError),
	/// A non-contract script step reported a failure.
	#[error("step failed: {0}")]
	Step(String),
}

/// A script step failed; the remaining steps were not executed.
#[derive(Debug, Error)]
#[error("script aborted at step {step}: {source}")]
pub struct ScriptAbortError {
	/// Index of the failing entry in the script.
	pub step: usize,
	/// What went wrong at that step.
	#[source]
	pub source: ClientError,
}
