//! Fixed-point conversions between decimal token amounts, 18-decimal base
//! units and wei.
//!
//! All arithmetic is done on 256-bit integers. Decimal input is parsed
//! digit-by-digit, so nothing here ever passes through binary floating point.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{GymError, Result};

/// Precision of GymCoin (and of ETH): 18 fractional digits.
pub const TOKEN_DECIMALS: u8 = 18;

/// 10^18, one whole token (or one ETH) in base units.
pub const BASE_UNIT_SCALE: u64 = 1_000_000_000_000_000_000;

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// A validated, non-negative token quantity with 18-decimal precision.
///
/// Stored as base units; [`Display`](fmt::Display) prints the canonical
/// decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount {
    base_units: U256,
}

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount {
        base_units: U256::ZERO,
    };

    /// Parse a user-entered decimal string.
    ///
    /// Digits past the 18th fractional place are dropped, never rounded.
    pub fn parse(input: &str) -> Result<Self> {
        parse_units(input, TOKEN_DECIMALS).map(Self::from_base_units)
    }

    /// Convert a [`Decimal`], truncating toward zero at 18 places.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(GymError::InvalidAmount(format!("{value} is negative")));
        }
        let truncated =
            value.round_dp_with_strategy(TOKEN_DECIMALS as u32, RoundingStrategy::ToZero);
        let mantissa = truncated.mantissa().unsigned_abs();
        let missing_places = TOKEN_DECIMALS - truncated.scale() as u8;
        U256::from(mantissa)
            .checked_mul(pow10(missing_places))
            .map(Self::from_base_units)
            .ok_or_else(|| GymError::InvalidAmount(format!("{value} out of range")))
    }

    pub const fn from_base_units(base_units: U256) -> Self {
        Self { base_units }
    }

    pub fn base_units(&self) -> U256 {
        self.base_units
    }

    pub fn is_zero(&self) -> bool {
        self.base_units.is_zero()
    }
}

impl FromStr for TokenAmount {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&from_base_units(self.base_units))
    }
}

impl serde::Serialize for TokenAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a decimal token amount into base units (× 10^18, truncated).
///
/// # Errors
///
/// Returns [`GymError::InvalidAmount`] for anything that is not a finite,
/// non-negative decimal literal, or that does not fit in 256 bits.
pub fn to_base_units(input: &str) -> Result<U256> {
    parse_units(input, TOKEN_DECIMALS)
}

/// Render base units as a decimal token amount.
pub fn from_base_units(base_units: U256) -> String {
    format_units(base_units, TOKEN_DECIMALS)
}

/// Render wei as a decimal ETH amount.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, TOKEN_DECIMALS)
}

/// Parse a decimal literal into an integer scaled by `10^decimals`.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256> {
    let invalid = |reason: &str| GymError::InvalidAmount(format!("{input:?}: {reason}"));

    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with('-') {
        return Err(invalid("amount must not be negative"));
    }

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("not a number"));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid("not a number"));
    }

    let whole = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|_| invalid("too large"))?
    };

    let kept = &frac_part[..frac_part.len().min(decimals as usize)];
    let fraction = if kept.is_empty() {
        U256::ZERO
    } else {
        let digits = U256::from_str_radix(kept, 10).map_err(|_| invalid("not a number"))?;
        digits * pow10(decimals - kept.len() as u8)
    };

    whole
        .checked_mul(pow10(decimals))
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| invalid("too large"))
}

/// Format an integer scaled by `10^decimals` as a decimal string.
///
/// Trailing fractional zeros are trimmed; whole values print without a dot.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let scale = pow10(decimals);
    let whole = value / scale;
    let fraction = value % scale;
    if fraction.is_zero() {
        return whole.to_string();
    }
    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{whole}.{}", padded.trim_end_matches('0'))
}

/// Wei owed for `base_units` at `rate_units / divisor` wei per base unit.
///
/// Multiplies before dividing so no precision is lost to an early
/// truncation.
pub fn wei_cost(base_units: U256, rate_units: U256, divisor: U256) -> Result<U256> {
    if divisor.is_zero() {
        return Err(GymError::InvalidRate("divisor must be positive".into()));
    }
    base_units
        .checked_mul(rate_units)
        .map(|product| product / divisor)
        .ok_or_else(|| {
            GymError::InvalidAmount(format!(
                "cost of {base_units} base units at {rate_units}/{divisor} overflows"
            ))
        })
}

/// Integer exchange rate pair, as read from the token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate {
    /// Wei (scaled by `divisor`) paid out per base unit sold.
    pub sell_rate_units: U256,
    /// Wei (scaled by `divisor`) charged per base unit bought.
    pub buy_rate_units: U256,
    pub divisor: U256,
}

impl ExchangeRate {
    pub fn new(sell_rate_units: U256, buy_rate_units: U256, divisor: U256) -> Result<Self> {
        if divisor.is_zero() {
            return Err(GymError::InvalidRate("divisor must be positive".into()));
        }
        Ok(Self {
            sell_rate_units,
            buy_rate_units,
            divisor,
        })
    }

    /// ETH cost (wei) of buying `amount`.
    pub fn buy_cost(&self, amount: &TokenAmount) -> Result<U256> {
        wei_cost(amount.base_units(), self.buy_rate_units, self.divisor)
    }

    /// ETH proceeds (wei) of selling `amount`.
    pub fn sell_proceeds(&self, amount: &TokenAmount) -> Result<U256> {
        wei_cost(amount.base_units(), self.sell_rate_units, self.divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn u(n: u128) -> U256 {
        U256::from(n)
    }

    fn tokens(n: u128) -> U256 {
        u(n) * u(BASE_UNIT_SCALE as u128)
    }

    // ---- to_base_units ----

    #[test]
    fn test_to_base_units_whole_and_fractional() {
        assert_eq!(to_base_units("1").unwrap(), tokens(1));
        assert_eq!(to_base_units("1.5").unwrap(), u(1_500_000_000_000_000_000));
        assert_eq!(to_base_units("0.000000000000000001").unwrap(), u(1));
        assert_eq!(to_base_units("1000").unwrap(), tokens(1000));
    }

    #[test]
    fn test_to_base_units_loose_forms() {
        assert_eq!(to_base_units(".5").unwrap(), u(500_000_000_000_000_000));
        assert_eq!(to_base_units("2.").unwrap(), tokens(2));
        assert_eq!(to_base_units("  3  ").unwrap(), tokens(3));
        assert_eq!(to_base_units("+4").unwrap(), tokens(4));
        assert_eq!(to_base_units("0").unwrap(), U256::ZERO);
    }

    #[test]
    fn test_to_base_units_truncates_excess_precision() {
        // 19th digit is dropped, not rounded up.
        assert_eq!(to_base_units("0.0000000000000000019").unwrap(), u(1));
        assert_eq!(to_base_units("0.9999999999999999999").unwrap(), u(999_999_999_999_999_999));
    }

    #[test]
    fn test_to_base_units_rejects_garbage() {
        for bad in ["", " ", ".", "-1", "-0.5", "abc", "1e18", "NaN", "inf", "1.2.3", "1,000", "0x10"] {
            let err = to_base_units(bad).unwrap_err();
            assert!(
                matches!(err, GymError::InvalidAmount(_)),
                "{bad:?} should be InvalidAmount, got {err:?}"
            );
        }
    }

    #[test]
    fn test_to_base_units_overflow_is_invalid_amount() {
        let huge = "9".repeat(80);
        assert!(matches!(
            to_base_units(&huge).unwrap_err(),
            GymError::InvalidAmount(_)
        ));
    }

    // ---- from_base_units / format_units ----

    #[test]
    fn test_from_base_units_formats() {
        assert_eq!(from_base_units(U256::ZERO), "0");
        assert_eq!(from_base_units(tokens(1000)), "1000");
        assert_eq!(from_base_units(u(1_500_000_000_000_000_000)), "1.5");
        assert_eq!(from_base_units(u(1)), "0.000000000000000001");
        assert_eq!(from_base_units(u(100_000_000_000_000)), "0.0001");
    }

    #[test]
    fn test_format_units_other_precisions() {
        assert_eq!(format_units(u(150), 2), "1.5");
        assert_eq!(format_units(u(42), 0), "42");
        assert_eq!(format_units(u(5), 6), "0.000005");
    }

    #[test]
    fn test_round_trip_truncates_to_18_places() {
        let cases = [
            ("1", "1"),
            ("1.50", "1.5"),
            ("0.123456789012345678", "0.123456789012345678"),
            ("0.1234567890123456789", "0.123456789012345678"),
            ("000123.000", "123"),
            (".25", "0.25"),
        ];
        for (input, expected) in cases {
            let round_tripped = from_base_units(to_base_units(input).unwrap());
            assert_eq!(round_tripped, expected, "input {input:?}");
        }
    }

    // ---- wei_cost ----

    #[test]
    fn test_wei_cost_scenario() {
        // rate=1, divisor=10^7, 1000 tokens -> 10^14 wei.
        let cost = wei_cost(tokens(1000), u(1), u(10_000_000)).unwrap();
        assert_eq!(cost, u(100_000_000_000_000));
        assert_eq!(format_ether(cost), "0.0001");
    }

    #[test]
    fn test_wei_cost_multiplies_before_dividing() {
        // Dividing first would give 3 / 2 * 3 = 3; the right answer is 9 / 2 = 4.
        assert_eq!(wei_cost(u(3), u(3), u(2)).unwrap(), u(4));
    }

    #[test]
    fn test_wei_cost_exceeds_u128() {
        // 10^24 base units * 10^15 wei rate overflows u128 but not U256.
        let base = tokens(1_000_000);
        let rate = u(1_000_000_000_000_000);
        let cost = wei_cost(base, rate, u(1)).unwrap();
        assert_eq!(cost.to_string(), format!("1{}", "0".repeat(39)));
    }

    #[test]
    fn test_wei_cost_zero_divisor() {
        assert!(matches!(
            wei_cost(u(1), u(1), U256::ZERO).unwrap_err(),
            GymError::InvalidRate(_)
        ));
    }

    #[test]
    fn test_wei_cost_overflow() {
        assert!(matches!(
            wei_cost(U256::MAX, u(2), u(1)).unwrap_err(),
            GymError::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_wei_cost_monotonicity() {
        let bases = [0u128, 1, 7, 1_000, 10u128.pow(21)];
        let rates = [0u128, 1, 3, 1_000_000_000_000_000];
        let divisors = [1u128, 2, 7, 10_000_000];
        for &b in &bases {
            for &r in &rates {
                for w in divisors.windows(2) {
                    let lo = wei_cost(u(b), u(r), u(w[0])).unwrap();
                    let hi = wei_cost(u(b), u(r), u(w[1])).unwrap();
                    assert!(lo >= hi, "divisor {} -> {} at b={b} r={r}", w[0], w[1]);
                }
            }
        }
        for &d in &divisors {
            for &r in &rates {
                for w in bases.windows(2) {
                    assert!(wei_cost(u(w[0]), u(r), u(d)).unwrap() <= wei_cost(u(w[1]), u(r), u(d)).unwrap());
                }
            }
            for &b in &bases {
                for w in rates.windows(2) {
                    assert!(wei_cost(u(b), u(w[0]), u(d)).unwrap() <= wei_cost(u(b), u(w[1]), u(d)).unwrap());
                }
            }
        }
    }

    // ---- TokenAmount ----

    #[test]
    fn test_token_amount_from_decimal() {
        assert_eq!(TokenAmount::from_decimal(dec!(1.5)).unwrap().base_units(), u(1_500_000_000_000_000_000));
        assert_eq!(TokenAmount::from_decimal(dec!(0)).unwrap(), TokenAmount::ZERO);
        assert_eq!(TokenAmount::from_decimal(dec!(42)).unwrap().to_string(), "42");
    }

    #[test]
    fn test_token_amount_from_decimal_truncates() {
        let amount = TokenAmount::from_decimal(dec!(0.0000000000000000019)).unwrap();
        assert_eq!(amount.base_units(), u(1));
    }

    #[test]
    fn test_token_amount_from_decimal_negative() {
        assert!(TokenAmount::from_decimal(dec!(-0.1)).is_err());
    }

    #[test]
    fn test_token_amount_display_and_from_str() {
        let amount: TokenAmount = "12.3400".parse().unwrap();
        assert_eq!(amount.to_string(), "12.34");
        assert!(!amount.is_zero());
        assert!(TokenAmount::parse("0.0").unwrap().is_zero());
    }

    // ---- ExchangeRate ----

    #[test]
    fn test_exchange_rate_requires_positive_divisor() {
        assert!(ExchangeRate::new(u(1), u(1), U256::ZERO).is_err());
    }

    #[test]
    fn test_exchange_rate_buy_and_sell_use_their_own_rate() {
        // 0.0009 ETH / token to sell, 0.001 ETH / token to buy.
        let rate = ExchangeRate::new(u(9), u(10), u(10_000)).unwrap();
        let amount = TokenAmount::parse("100").unwrap();
        assert_eq!(format_ether(rate.buy_cost(&amount).unwrap()), "0.1");
        assert_eq!(format_ether(rate.sell_proceeds(&amount).unwrap()), "0.09");
    }
}
