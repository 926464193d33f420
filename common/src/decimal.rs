//! Exact decimal conversions for on-chain quantities. Balances stay in
//! `BigDecimal` from decode to cache write; floats would lose precision
//! on wei-scale values and compound across networks and components.

use bigdecimal::{num_bigint::BigInt, BigDecimal, RoundingMode};
use primitive_types::U256;

const WEI_SCALE: i64 = 18;
const PRICE_SCALE: i64 = 8;
const TOTAL_SCALE: i64 = 2;

fn scaled(value: U256, scale: i64) -> BigDecimal {
    // the decimal rendering of a U256 always parses
    let digits = BigInt::parse_bytes(value.to_string().as_bytes(), 10).unwrap_or_default();

    BigDecimal::new(digits, scale)
}

/// An 18-decimals fixed-point word as token (or USD) units.
pub fn from_wei(value: U256) -> BigDecimal {
    scaled(value, WEI_SCALE)
}

/// An 8-decimals raw price as USD.
pub fn from_price_raw(value: U256) -> BigDecimal {
    scaled(value, PRICE_SCALE)
}

/// Truncates to two decimal places, never rounding up: totals must not
/// overstate a user's holding. Applied exactly once, at the point a
/// total is cached or returned.
pub fn truncate(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(TOTAL_SCALE, RoundingMode::Down)
}
