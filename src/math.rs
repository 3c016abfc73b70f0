//! Fixed-point helpers for token amounts
//!
//! Token balances travel in two shapes: raw base units (`U256`) as they
//! appear on-chain, and display amounts (`Decimal`) once the token's decimal
//! exponent has been applied. Everything here converts between the two
//! without routing a large integer through native floating point.

use crate::{Error, Result};
use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

/// Digits of the float factor kept by [`scale_float_to_bigint`]
const SCALE_DIGITS: u32 = 5;
const SCALE_FACTOR: u64 = 100_000;

/// Natural log of a non-zero integer of any width.
///
/// Only the top 64 bits take part in the mantissa; the remaining shift is
/// folded in as a multiple of ln(2).
fn ln_u256(value: U256) -> f64 {
    let bits = value.bit_len();
    let shift = bits.saturating_sub(64);
    let top = (value >> shift).as_limbs()[0];
    (top as f64).ln() + shift as f64 * std::f64::consts::LN_2
}

/// Compute `numerator / denominator` as a float in the log domain.
///
/// Both operands must be non-zero: a zero reserve has no meaningful ratio
/// and callers are expected to handle it before asking for a price.
pub fn to_ratio(numerator: U256, denominator: U256) -> Result<f64> {
    if numerator.is_zero() || denominator.is_zero() {
        return Err(Error::Math(format!(
            "ratio of {} / {} is undefined in the log domain",
            numerator, denominator
        )));
    }

    Ok((ln_u256(numerator) - ln_u256(denominator)).exp())
}

/// Multiply a base-unit amount by a float factor.
///
/// The factor is rounded to five decimal places and applied as an integer
/// multiply followed by an integer divide, so precision beyond 1e-5 in `y`
/// is deliberately discarded.
pub fn scale_float_to_bigint(x: U256, y: f64) -> Result<U256> {
    if !y.is_finite() || y < 0.0 {
        return Err(Error::Math(format!("cannot scale by {}", y)));
    }

    let scaled = (y * SCALE_FACTOR as f64).round();
    if scaled > u128::MAX as f64 {
        return Err(Error::Math(format!("scale factor {} is too large", y)));
    }

    x.checked_mul(U256::from(scaled as u128))
        .map(|product| product / U256::from(SCALE_FACTOR))
        .ok_or_else(|| Error::Math(format!("{} * {} overflows", x, y)))
}

/// `10^exp` as a base-unit multiplier
pub fn pow10(exp: u32) -> U256 {
    U256::from(10).pow(U256::from(exp))
}

/// Convert raw base units into a display amount
pub fn from_base_units(value: U256, decimals: u32) -> Result<Decimal> {
    let raw = u128::try_from(value)
        .ok()
        .and_then(|raw| i128::try_from(raw).ok())
        .ok_or_else(|| Error::Math(format!("{} does not fit a decimal", value)))?;

    Decimal::try_from_i128_with_scale(raw, decimals)
        .map_err(|e| Error::Math(format!("{} with {} decimals: {}", value, decimals, e)))
}

/// Convert a display amount into raw base units, truncating any digits
/// beyond the token's decimal exponent.
pub fn to_base_units(value: Decimal, decimals: u32) -> Result<U256> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::Math(format!("negative amount {}", value)));
    }

    let truncated = value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    let mantissa = u128::try_from(truncated.mantissa())
        .map_err(|_| Error::Math(format!("negative amount {}", value)))?;

    // `round_dp` never leaves more fractional digits than requested
    let missing = decimals.saturating_sub(truncated.scale());
    Ok(U256::from(mantissa) * pow10(missing))
}

/// Move a base-unit amount from one decimal exponent to another.
///
/// Scaling down truncates.
pub fn rescale(value: U256, from_decimals: u32, to_decimals: u32) -> U256 {
    if to_decimals >= from_decimals {
        value * pow10(to_decimals - from_decimals)
    } else {
        value / pow10(from_decimals - to_decimals)
    }
}
