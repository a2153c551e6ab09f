//! Hex string prefix helpers.

/// Ensures a hex string carries a `0x` prefix.
pub fn with_0x_prefix(hex: &str) -> String {
	if hex.starts_with("0x") {
		hex.to_string()
	} else {
		format!("0x{}", hex)
	}
}

/// Strips a leading `0x` prefix if present.
pub fn without_0x_prefix(hex: &str) -> &str {
	hex.strip_prefix("0x").unwrap_or(hex)
}
