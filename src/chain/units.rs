//! DOT amount conversions.
//!
//! Substrate (Polkadot, Asset Hub) counts DOT with 10 decimals; the Revive EVM
//! layer counts the same DOT with 18. Contract views such as the gas tank
//! come back in 18-decimal units.

use alloy::primitives::U256;

pub const DOT_DECIMALS_SUBSTRATE: u8 = 10;

const REVIVE_SCALE: u64 = 100_000_000; // 10^(18 - 10)

/// Revive units (18 decimals) -> substrate plancks (10 decimals), truncating
pub fn from_revive_decimals(revive_amount: U256) -> U256 {
    revive_amount / U256::from(REVIVE_SCALE)
}

/// Human-readable value of a raw token amount
pub fn to_decimal(amount: u128, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}
