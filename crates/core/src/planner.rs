//! Liquidation sizing and call parameters.
//!
//! Debt and collateral are treated at 1:1 nominal value; the bonus is the
//! only premium applied. No prices are consulted.

use alloy::primitives::{Address, U256};
use tracing::debug;

use crate::inspector::{CollateralHolding, DebtHolding};
use crate::u256_math;
use lendsweep_chain::{LiquidationParams, SwapParams};

/// Signals the bot contract to cover the full requested amount (2^256 - 1).
pub const UNLIMITED_DEBT_TO_COVER: U256 = U256::MAX;

/// Swap legs for the seized collateral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRoute {
    /// Profit receiver
    pub receiver: Address,
    pub router: Address,
    /// collateral -> debt
    pub path1: [Address; 2],
    /// debt -> wrapped native
    pub path2: [Address; 2],
}

/// One fully sized liquidation, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationPlan {
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub user: Address,
    /// Collateral-bearing token the liquidity was read against
    pub bearing_token: Address,
    /// Bounded collateral amount
    pub seize_amount: U256,
    /// Either the liquidity cap or [`UNLIMITED_DEBT_TO_COVER`]
    pub debt_to_cover: U256,
    pub route: SwapRoute,
}

impl LiquidationPlan {
    /// Whether the seize amount was capped by available liquidity.
    pub fn is_capped(&self) -> bool {
        self.debt_to_cover != UNLIMITED_DEBT_TO_COVER
    }

    pub fn liquidation_params(&self) -> LiquidationParams {
        LiquidationParams {
            collateralAsset: self.collateral_asset,
            debtAsset: self.debt_asset,
            user: self.user,
            amount: self.seize_amount,
            transferAmount: U256::ZERO,
            debtToCover: self.debt_to_cover,
        }
    }

    pub fn swap_params(&self) -> SwapParams {
        SwapParams {
            receiver: self.route.receiver,
            swapRouter: self.route.router,
            path1: self.route.path1.to_vec(),
            path2: self.route.path2.to_vec(),
        }
    }
}

/// Pure sizing logic; holds only the static routing inputs.
#[derive(Debug, Clone)]
pub struct LiquidationPlanner {
    receiver: Address,
    router: Address,
    wrapped_native: Address,
    bonus_bps: u16,
}

impl LiquidationPlanner {
    pub fn new(receiver: Address, router: Address, wrapped_native: Address, bonus_bps: u16) -> Self {
        Self {
            receiver,
            router,
            wrapped_native,
            bonus_bps,
        }
    }

    /// Debt plus the liquidation bonus.
    pub fn desired_seize(&self, debt: U256) -> U256 {
        u256_math::apply_basis_points_up(debt, self.bonus_bps)
    }

    /// Size a liquidation against the collateral `liquidity` available.
    pub fn plan(
        &self,
        user: Address,
        collateral: &CollateralHolding,
        debt: &DebtHolding,
        liquidity: U256,
    ) -> LiquidationPlan {
        let desired = self.desired_seize(debt.amount);
        let seize_amount = u256_math::min(desired, liquidity);
        let debt_to_cover = if desired > liquidity {
            liquidity
        } else {
            UNLIMITED_DEBT_TO_COVER
        };

        debug!(
            %user,
            debt = %debt.amount,
            desired = %desired,
            liquidity = %liquidity,
            seize = %seize_amount,
            capped = desired > liquidity,
            "Liquidation sized"
        );

        LiquidationPlan {
            collateral_asset: collateral.underlying,
            debt_asset: debt.underlying,
            user,
            bearing_token: collateral.bearing_token,
            seize_amount,
            debt_to_cover,
            route: SwapRoute {
                receiver: self.receiver,
                router: self.router,
                path1: [collateral.underlying, debt.underlying],
                path2: [debt.underlying, self.wrapped_native],
            },
        }
    }
}
