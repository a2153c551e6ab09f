//! Tagged resolution of call-target addresses.

use alloy_primitives::Address;

/// Where an external call or transfer is directed.
///
/// Callers either hand over a raw address or point at a contract handle that
/// already knows where it lives; the distinction is carried explicitly and
/// resolved at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
	/// A bare address supplied directly by the caller.
	Raw(Address),
	/// The address of an already-bound contract handle.
	Handle(Address),
}

impl CallTarget {
	/// The concrete address to call.
	pub fn resolve(&self) -> Address {
		match self {
			CallTarget::Raw(address) | CallTarget::Handle(address) => *address,
		}
	}
}

impl From<Address> for CallTarget {
	fn from(address: Address) -> Self {
		CallTarget::Raw(address)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolves_both_variants() {
		let address = Address::repeat_byte(0x11);
		assert_eq!(CallTarget::Raw(address).resolve(), address);
		assert_eq!(CallTarget::Handle(address).resolve(), address);
		assert_eq!(CallTarget::from(address), CallTarget::Raw(address));
	}
}
