use crate::errors::Error;
use crate::fixed_point::{divider, narrow, pow10_wide, rescale, PRICE_DECIMALS, U256};

/// How a native currency payment is turned into a token allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum PricingMode {
    /// `payment / price`, the payment being already in price units.
    #[default]
    Direct,
    /// `payment * oracle_answer * rate / price`.
    OracleRate,
}

/// Raw token units bought by `payment` (18 decimals) at `price`.
pub fn direct_allocation(payment: u128, price: u128, token_decimals: u8) -> Result<u128, Error> {
    divider(payment, price, token_decimals)
}

/// Raw token units bought by a native `payment` valued through an oracle
/// answer carrying `answer_decimals`, scaled by `rate`.
///
/// Computes `floor(payment * answer * rate * 10^token_decimals /
/// (10^answer_decimals * price))` in 256 bits with a single truncation.
pub fn oracle_allocation(
    payment: u128,
    answer: u128,
    answer_decimals: u8,
    rate: u128,
    price: u128,
    token_decimals: u8,
) -> Result<u128, Error> {
    if price == 0 {
        return Err(Error::DivisionByZero);
    }

    let numerator = [payment, answer, rate]
        .into_iter()
        .try_fold(pow10_wide(token_decimals)?, |acc, factor| {
            acc.checked_mul(U256::from(factor))
        })
        .ok_or(Error::Overflow)?;
    let denominator = pow10_wide(answer_decimals)?
        .checked_mul(U256::from(price))
        .ok_or(Error::Overflow)?;

    narrow(numerator / denominator)
}

/// Raw token units bought by `amount` of an asset with `asset_decimals`.
pub fn stable_allocation(
    amount: u128,
    asset_decimals: u8,
    price: u128,
    token_decimals: u8,
) -> Result<u128, Error> {
    let normalized = rescale(amount, asset_decimals, PRICE_DECIMALS)?;
    divider(normalized, price, token_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::PRICE_PRECISION;

    /// `whole / 10^decimals` as an 18-decimal price.
    fn price(whole: u128, decimals: u32) -> u128 {
        whole * PRICE_PRECISION / 10u128.pow(decimals)
    }

    const USDT: u128 = 1_000_000;

    #[test]
    fn stable_allocation_normalizes_six_decimal_assets() {
        assert_eq!(stable_allocation(5 * USDT, 6, price(2, 2), 0), Ok(250));
        assert_eq!(stable_allocation(21 * USDT, 6, price(25, 3), 0), Ok(840));
        assert_eq!(stable_allocation(44 * USDT, 6, price(238, 4), 0), Ok(1_848));
        assert_eq!(
            stable_allocation(245_012 * USDT, 6, price(25, 3), 0),
            Ok(9_800_480)
        );
    }

    #[test]
    fn stable_allocation_in_eighteen_decimal_token_units() {
        assert_eq!(
            stable_allocation(5 * USDT, 6, price(2, 2), 18),
            Ok(250 * PRICE_PRECISION)
        );
    }

    #[test]
    fn stable_allocation_without_normalization_would_be_wrong() {
        // The raw 6-decimal amount divided directly is off by 10^12.
        assert_eq!(direct_allocation(5 * USDT, price(2, 2), 0), Ok(0));
        assert_eq!(direct_allocation(5 * USDT, price(2, 2), 12), Ok(250));
    }

    #[test]
    fn direct_allocation_is_divider_at_token_precision() {
        let payment = 15 * PRICE_PRECISION + PRICE_PRECISION / 2;
        assert_eq!(direct_allocation(payment, price(2, 2), 0), Ok(775));
        assert_eq!(
            direct_allocation(payment, price(2, 2), 18),
            divider(payment, price(2, 2), 18)
        );
    }

    #[test]
    fn oracle_allocation_values_payment_in_quote_currency() {
        // 15.5 native at 300.12345678 (8 decimals) = 4 651.91358009 / 0.02
        let payment = 15 * PRICE_PRECISION + PRICE_PRECISION / 2;
        assert_eq!(
            oracle_allocation(payment, 30_012_345_678, 8, 1, price(2, 2), 0),
            Ok(232_595)
        );
    }

    #[test]
    fn oracle_allocation_applies_rate() {
        let one = PRICE_PRECISION;
        let base = oracle_allocation(one, 400 * 100_000_000, 8, 1, price(2, 2), 0).unwrap();
        let doubled = oracle_allocation(one, 400 * 100_000_000, 8, 2, price(2, 2), 0).unwrap();
        assert_eq!(base, 20_000);
        assert_eq!(doubled, 2 * base);
    }

    #[test]
    fn oracle_allocation_with_eighteen_decimal_answer() {
        // 200.0 per native unit at 18 decimals, token at 0.02
        let answer = 200 * PRICE_PRECISION;
        assert_eq!(
            oracle_allocation(PRICE_PRECISION, answer, 18, 1, price(2, 2), 0),
            Ok(10_000)
        );
        assert_eq!(
            oracle_allocation(2 * PRICE_PRECISION, answer, 18, 1, price(2, 2), 0),
            Ok(20_000)
        );
        assert_eq!(
            oracle_allocation(2 * PRICE_PRECISION, answer, 18, 1, price(2, 2), 18),
            Ok(20_000 * PRICE_PRECISION)
        );
    }

    #[test]
    fn oracle_allocation_with_large_rate() {
        // 300.0 at 8 decimals, rate 2e10
        assert_eq!(
            oracle_allocation(PRICE_PRECISION, 30_000_000_000, 8, 20_000_000_000, price(2, 2), 0),
            Ok(300_000_000_000_000)
        );
    }

    #[test]
    fn oracle_allocation_truncates_once() {
        // 0.1 * 10^1 / 1 = 1; flooring the valuation first would give 0
        assert_eq!(oracle_allocation(1, 1, 1, 1, 1, 1), Ok(1));
        // 15.5 * 300.12345678 / 0.02 = 232 595.679...
        let payment = 15 * PRICE_PRECISION + PRICE_PRECISION / 2;
        assert_eq!(
            oracle_allocation(payment, 30_012_345_678, 8, 1, price(2, 2), 3),
            Ok(232_595_679)
        );
    }

    #[test]
    fn zero_price_is_a_division_by_zero() {
        assert_eq!(direct_allocation(1, 0, 18), Err(Error::DivisionByZero));
        assert_eq!(stable_allocation(1, 6, 0, 18), Err(Error::DivisionByZero));
        assert_eq!(oracle_allocation(1, 1, 8, 1, 0, 18), Err(Error::DivisionByZero));
    }

    #[test]
    fn oracle_result_beyond_u128_is_reported() {
        assert_eq!(
            oracle_allocation(u128::MAX, 2, 0, 1, 1, 0),
            Err(Error::Overflow)
        );
    }
}
