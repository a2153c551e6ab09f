//! Shared utilities: hex formatting and EIP-712 hashing helpers.

pub mod eip712;
pub mod formatting;

pub use eip712::{final_digest, Eip712Encoder, NAMED_DOMAIN_TYPE, UNNAMED_DOMAIN_TYPE};
pub use formatting::{with_0x_prefix, without_0x_prefix};
