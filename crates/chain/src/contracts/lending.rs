//! Lending market interfaces: pool, bearing tokens and the liquidation bot.

use alloy::sol;

// Lending pool (Aave V3 style)
sol! {
    /// Pool interface (subset needed for health checks)
    #[sol(rpc)]
    interface IPool {
        function getUserAccountData(address user)
            external
            view
            returns (
                uint256 totalCollateralBase,
                uint256 totalDebtBase,
                uint256 availableBorrowsBase,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }
}

// Collateral-bearing (m) and debt-bearing (d) tokens share this surface.
sol! {
    /// Bearing token interface
    #[sol(rpc)]
    interface IMToken {
        function balanceOf(address user) external view returns (uint256);
        function UNDERLYING_ASSET_ADDRESS() external view returns (address);
    }
}

// Per-pool liquidation bot contract
sol! {
    /// Liquidation leg of `execute`.
    #[derive(Debug, PartialEq, Eq)]
    struct LiquidationParams {
        address collateralAsset;
        address debtAsset;
        address user;
        uint256 amount;
        uint256 transferAmount;
        uint256 debtToCover;
    }

    /// Swap leg of `execute`.
    #[derive(Debug, PartialEq, Eq)]
    struct SwapParams {
        address receiver;
        address swapRouter;
        address[] path1;
        address[] path2;
    }

    /// Liquidation bot contract interface
    #[sol(rpc)]
    interface ILiquidationBot {
        function execute(LiquidationParams calldata lParam, SwapParams calldata sParam) external;
    }
}
