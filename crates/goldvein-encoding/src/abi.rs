//! Solidity interfaces consumed by the client.
//!
//! Only the encoding shapes matter here; execution semantics live in the
//! contracts themselves.

use alloy_sol_types::sol;

sol! {
	/// Lending pair surface.
	interface IGoldVeinPair {
		function cook(uint8[] calldata actions, uint256[] calldata values, bytes[] calldata datas) external payable returns (uint256 value1, uint256 value2);
		function accrue() external;
		function updateExchangeRate() external returns (bool updated, uint256 rate);
		function repay(address to, bool skim, uint256 part) external returns (uint256 amount);
		function asset() external view returns (address);
		function collateral() external view returns (address);
	}

	/// Companion vault (shared-custody ledger) surface.
	interface IAlpineVault {
		function deploy(address masterContract, bytes calldata data, bool useCreate2) external payable returns (address cloneAddress);

		event LogDeploy(address indexed masterContract, bytes data, address indexed cloneAddress);
	}

	/// Minimal permit-capable ERC20 surface.
	interface IERC20 {
		function approve(address spender, uint256 amount) external returns (bool success);
		function balanceOf(address owner) external view returns (uint256 balance);
		function allowance(address owner, address spender) external view returns (uint256 remaining);
		function transfer(address to, uint256 amount) external returns (bool success);
		function transferFrom(address from, address to, uint256 amount) external returns (bool success);
		function permit(address owner_, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
		function nonces(address owner) external view returns (uint256 nonce);
		function DOMAIN_SEPARATOR() external view returns (bytes32 separator);
	}

	/// Swapper strategy surface used by leveraged open/close.
	interface ISwapper {
		function swap(address fromToken, address toToken, address recipient, uint256 shareToMin, uint256 shareFrom) external returns (uint256 extraShare, uint256 shareReturned);
		function swapExact(address fromToken, address toToken, address recipient, address refundTo, uint256 shareFromSupplied, uint256 shareToExact) external returns (uint256 shareUsed, uint256 shareReturned);
	}
}
