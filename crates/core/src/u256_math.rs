//! U256 arithmetic for health factors and liquidation amounts.
//!
//! Health factors are 18-decimal fixed point (WAD). Amounts stay in native
//! token units; nothing here converts through floating point except the
//! logging helper [`wad_to_f64`].

use alloy::primitives::U256;

/// WAD constant: 1e18 for 18-decimal fixed-point arithmetic
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10000u64, 0, 0, 0]);

/// Apply basis points increase (e.g., for a liquidation bonus).
/// Returns: value * (10000 + basis_points) / 10000
///
/// Example: apply_basis_points_up(100, 1000) = 110 (10% increase)
///
/// Splits `value` by the denominator so the intermediate product never
/// overflows. A result above `U256::MAX` clamps to `U256::MAX`, so the
/// result is never below `value`.
#[inline(always)]
pub fn apply_basis_points_up(value: U256, basis_points: u16) -> U256 {
    let factor = U256::from(10000u32 + basis_points as u32);
    let whole = value / BPS_DENOMINATOR;
    let rest = value % BPS_DENOMINATOR;
    whole
        .saturating_mul(factor)
        .saturating_add(rest * factor / BPS_DENOMINATOR)
}

/// Check if health factor is below 1.0.
#[inline(always)]
pub fn is_liquidatable_wad(hf_wad: U256) -> bool {
    hf_wad < WAD
}

/// Check if a decoded health factor marks a position for liquidation.
///
/// Zero means the account has no debt and is never liquidatable.
#[inline(always)]
pub fn is_unhealthy_wad(hf_wad: U256) -> bool {
    !hf_wad.is_zero() && is_liquidatable_wad(hf_wad)
}

/// Convert WAD (18 decimals) to f64.
/// Use only for display/logging, not for computation.
#[inline(always)]
pub fn wad_to_f64(wad: U256) -> f64 {
    if wad <= U256::from(u128::MAX) {
        let value: u128 = wad.to();
        value as f64 / 1e18
    } else {
        f64::INFINITY
    }
}

/// Safe minimum of two U256 values
#[inline(always)]
pub fn min(a: U256, b: U256) -> U256 {
    if a < b {
        a
    } else {
        b
    }
}
