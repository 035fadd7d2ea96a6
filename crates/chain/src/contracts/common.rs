//! Common contract interfaces shared across protocols.
//!
//! This module provides type definitions for standard interfaces like
//! ERC20 tokens and the Maker-style multicall aggregator.

use alloy::sol;

// ERC20 interface for token interactions
sol! {
    /// Standard ERC20 interface (subset for liquidation needs)
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

// Multicall (v1) aggregator: reverts as a whole if any inner call reverts.
sol! {
    /// A single `(target, calldata)` pair.
    #[derive(Debug)]
    struct Call {
        address target;
        bytes callData;
    }

    /// Multicall aggregator interface
    #[sol(rpc)]
    interface IMulticall {
        function aggregate(Call[] calldata calls)
            external
            returns (uint256 blockNumber, bytes[] memory returnData);
    }
}
