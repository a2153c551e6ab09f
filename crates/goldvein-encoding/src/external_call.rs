//! Generic external-call payload for the `Call` opcode.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;

use crate::EncodingError;

/// Width of the slot stripped for result injection.
const WORD: usize = 32;

/// Payload of the generic external-call action.
///
/// The settlement contract keeps two running registers across a batch: the
/// amount-unit and share-unit results of the last action. When
/// `use_amount_result` or `use_share_result` is set, it appends that
/// register as the call's final argument word at execution time, so the
/// calldata carried here must already be truncated by exactly one ABI word.
/// The constructors own that truncation; payloads are never built with a
/// dangling placeholder argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCallPayload {
	/// Contract to call.
	pub target: Address,
	/// Calldata, truncated by one word when a result is injected.
	pub call_data: Bytes,
	/// Append the running amount-unit result as the final argument.
	pub use_amount_result: bool,
	/// Append the running share-unit result as the final argument.
	pub use_share_result: bool,
	/// How many words of the call's return data are captured back into the
	/// running registers.
	pub captured_return_words: u8,
}

impl ExternalCallPayload {
	/// A plain call: full calldata, nothing injected or captured.
	pub fn plain(target: Address, call_data: Vec<u8>) -> Self {
		Self {
			target,
			call_data: call_data.into(),
			use_amount_result: false,
			use_share_result: false,
			captured_return_words: 0,
		}
	}

	/// A call whose final argument is the preceding action's amount-unit
	/// result. Strips the placeholder word from `call_data`.
	pub fn with_amount_result(
		target: Address,
		call_data: Vec<u8>,
		captured_return_words: u8,
	) -> Result<Self, EncodingError> {
		Ok(Self {
			target,
			call_data: strip_result_slot(call_data)?.into(),
			use_amount_result: true,
			use_share_result: false,
			captured_return_words,
		})
	}

	/// A call whose final argument is the preceding action's share-unit
	/// result. Strips the placeholder word from `call_data`.
	pub fn with_share_result(
		target: Address,
		call_data: Vec<u8>,
		captured_return_words: u8,
	) -> Result<Self, EncodingError> {
		Ok(Self {
			target,
			call_data: strip_result_slot(call_data)?.into(),
			use_amount_result: false,
			use_share_result: true,
			captured_return_words,
		})
	}

	/// ABI-encodes the payload as the settlement contract decodes it:
	/// `(address, bytes, bool, bool, uint8)`.
	pub fn encode(&self) -> Bytes {
		(
			self.target,
			self.call_data.clone(),
			self.use_amount_result,
			self.use_share_result,
			U256::from(self.captured_return_words),
		)
			.abi_encode_params()
			.into()
	}
}

/// Removes the final fixed-width argument word, leaving the slot for the
/// contract to fill.
fn strip_result_slot(mut call_data: Vec<u8>) -> Result<Vec<u8>, EncodingError> {
	// A selector plus at least the word being stripped must be present.
	if call_data.len() < 4 + WORD {
		return Err(EncodingError::CalldataTooShort { len: call_data.len() });
	}
	call_data.truncate(call_data.len() - WORD);
	Ok(call_data)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_exactly_one_word() {
		let target = Address::repeat_byte(0x0f);
		let call_data = vec![0xffu8; 4 + 3 * WORD];
		let payload = ExternalCallPayload::with_share_result(target, call_data.clone(), 2).unwrap();
		assert_eq!(payload.call_data.len(), call_data.len() - WORD);
		assert!(payload.use_share_result);
		assert!(!payload.use_amount_result);
	}

	#[test]
	fn rejects_calldata_without_an_argument_word() {
		let target = Address::repeat_byte(0x0f);
		let err = ExternalCallPayload::with_amount_result(target, vec![0u8; 4], 2).unwrap_err();
		assert!(matches!(err, EncodingError::CalldataTooShort { len: 4 }));
	}

	#[test]
	fn encodes_the_contract_layout() {
		let target = Address::repeat_byte(0x0f);
		let payload = ExternalCallPayload::plain(target, vec![0xaa, 0xbb, 0xcc, 0xdd]);
		let encoded = payload.encode();

		let (decoded_target, data, use_amount, use_share, words) =
			<(Address, Bytes, bool, bool, U256)>::abi_decode_params(&encoded, true).unwrap();
		assert_eq!(decoded_target, target);
		assert_eq!(data.as_ref(), &[0xaa, 0xbb, 0xcc, 0xdd]);
		assert!(!use_amount);
		assert!(!use_share);
		assert_eq!(words, U256::ZERO);

		// Five head words precede the bytes tail; the bytes offset points
		// past them.
		assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(160u64));
	}
}
