//! Fixed-point helpers shared by every price computation.
//!
//! All divisions truncate toward zero. Intermediates are 256 bits wide so
//! `numerator * 10^precision` cannot wrap before the division.

use crate::errors::Error;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for intermediate products.
    pub struct U256(4);
}

/// Decimal places of every normalized payment amount and of the price.
pub const PRICE_DECIMALS: u8 = 18;

/// One whole unit at 18 decimals.
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// `10^decimals` as a 256-bit value.
pub fn pow10_wide(decimals: u8) -> Result<U256, Error> {
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or(Error::Overflow)
}

/// Narrows a 256-bit result back to `u128`.
pub fn narrow(value: U256) -> Result<u128, Error> {
    if value > U256::from(u128::MAX) {
        return Err(Error::Overflow);
    }
    Ok(value.low_u128())
}

/// `10^decimals`, failing when it does not fit in a `u128`.
pub fn pow10(decimals: u8) -> Result<u128, Error> {
    narrow(pow10_wide(decimals)?)
}

/// Returns `floor(numerator * 10^precision / denominator)`.
pub fn divider(numerator: u128, denominator: u128, precision: u8) -> Result<u128, Error> {
    if denominator == 0 {
        return Err(Error::DivisionByZero);
    }
    let scaled = U256::from(numerator)
        .checked_mul(pow10_wide(precision)?)
        .ok_or(Error::Overflow)?;
    narrow(scaled / U256::from(denominator))
}

/// Moves `amount` from `from_decimals` to `to_decimals`.
///
/// Scaling up is exact; scaling down truncates.
pub fn rescale(amount: u128, from_decimals: u8, to_decimals: u8) -> Result<u128, Error> {
    if to_decimals >= from_decimals {
        divider(amount, 1, to_decimals - from_decimals)
    } else {
        divider(amount, pow10(from_decimals - to_decimals)?, 0)
    }
}
