//! High-precision decimal arithmetic
//!
//! All series values flow through [`WorkingPrecision`], which rounds every
//! result to a fixed number of significant digits. Floating point is only
//! used for the order-of-magnitude estimate of the stopping threshold.

use crate::errors::{PiError, Result};
use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::str::FromStr;

/// Digits kept beyond the requested precision
pub const SAFETY_MARGIN: u64 = 10;

/// Floor on working precision (decimal64 significand)
pub const MIN_SIGNIFICANT_DIGITS: u64 = 16;

/// Requested number of correct decimal digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precision {
    digits: u32,
}

impl Precision {
    /// Default digits when none are requested
    pub const DEFAULT_DIGITS: u32 = 5;

    pub fn new(digits: u32) -> Self {
        Self { digits }
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Exact stopping threshold `10^-digits`
    pub fn threshold(&self) -> BigDecimal {
        BigDecimal::new(1.into(), i64::from(self.digits))
    }

    /// Cheap order-of-magnitude estimate of the threshold
    pub fn threshold_estimate(&self) -> f64 {
        10f64.powf(-f64::from(self.digits))
    }

    /// Working precision large enough to keep rounding noise below the target
    pub fn working(&self) -> WorkingPrecision {
        let significant = (self.digits as u64 + SAFETY_MARGIN).max(MIN_SIGNIFICANT_DIGITS);
        WorkingPrecision::new(significant)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIGITS)
    }
}

/// Fixed significant-digit context applied after every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingPrecision {
    significant_digits: NonZeroU64,
    rounding: RoundingMode,
}

impl WorkingPrecision {
    /// Create a context rounding half-to-even at `significant_digits` (min 1)
    pub fn new(significant_digits: u64) -> Self {
        Self {
            significant_digits: NonZeroU64::new(significant_digits).unwrap_or(NonZeroU64::MIN),
            rounding: RoundingMode::HalfEven,
        }
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn significant_digits(&self) -> u64 {
        self.significant_digits.get()
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Round a value into this context
    pub fn round(&self, value: &BigDecimal) -> BigDecimal {
        if value.is_zero() {
            return BigDecimal::zero();
        }
        value.with_precision_round(self.significant_digits, self.rounding)
    }

    pub fn add(&self, lhs: &BigDecimal, rhs: &BigDecimal) -> BigDecimal {
        self.round(&(lhs + rhs))
    }

    pub fn subtract(&self, lhs: &BigDecimal, rhs: &BigDecimal) -> BigDecimal {
        self.round(&(lhs - rhs))
    }

    /// Divide, rounding the quotient to working precision
    pub fn divide(&self, numerator: &BigDecimal, denominator: &BigDecimal) -> Result<BigDecimal> {
        if denominator.is_zero() {
            return Err(PiError::DivisionByZero);
        }
        Ok(self.round(&(numerator / denominator)))
    }

    /// Sum many values, rounding after each addition
    pub fn sum<'a, I>(&self, values: I) -> BigDecimal
    where
        I: IntoIterator<Item = &'a BigDecimal>,
    {
        values
            .into_iter()
            .fold(BigDecimal::zero(), |acc, v| self.add(&acc, v))
    }
}

/// Round toward zero at `digits` decimal places
pub fn truncate_to_digits(value: &BigDecimal, digits: u32) -> BigDecimal {
    value.with_scale_round(digits as i64, RoundingMode::Down)
}

/// Parse a decimal string as returned by the compute service
pub fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_threshold_is_exact_power_of_ten() {
        assert_eq!(Precision::new(1).threshold(), dec("0.1"));
        assert_eq!(Precision::new(5).threshold(), dec("0.00001"));
        assert_eq!(Precision::new(0).threshold(), dec("1"));
    }

    #[test]
    fn test_threshold_estimate_matches_order_of_magnitude() {
        let estimate = Precision::new(3).threshold_estimate();
        assert!((estimate - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_at_extreme_digits() {
        let precision = Precision::new(u32::MAX);
        assert_eq!(precision.threshold_estimate(), 0.0);

        let (mantissa, scale) = precision.threshold().as_bigint_and_exponent();
        assert_eq!(mantissa, bigdecimal::num_bigint::BigInt::from(1));
        assert_eq!(scale, i64::from(u32::MAX));
        assert_eq!(Precision::new(2_147_483_648).threshold_estimate(), 0.0);
    }

    #[test]
    fn test_working_precision_has_margin() {
        assert_eq!(Precision::new(1).working().significant_digits(), 16);
        assert_eq!(Precision::new(30).working().significant_digits(), 40);
    }

    #[test]
    fn test_divide_rounds_instead_of_truncating_to_integer() {
        let ctx = WorkingPrecision::new(16);
        let q = ctx.divide(&dec("4"), &dec("3")).unwrap();
        assert_eq!(q, dec("1.333333333333333"));

        let q = ctx.divide(&dec("2"), &dec("3")).unwrap();
        assert_eq!(q, dec("0.6666666666666667"));
    }

    #[test]
    fn test_divide_by_zero() {
        let ctx = WorkingPrecision::new(16);
        let err = ctx.divide(&dec("4"), &BigDecimal::zero()).unwrap_err();
        assert!(matches!(err, PiError::DivisionByZero));
    }

    #[test]
    fn test_add_subtract_round_to_context() {
        let ctx = WorkingPrecision::new(5);
        assert_eq!(ctx.add(&dec("1.23456"), &dec("0.000004")), dec("1.2346"));
        assert_eq!(ctx.subtract(&dec("3"), &dec("3")), BigDecimal::zero());
    }

    #[test]
    fn test_truncate_rounds_toward_zero() {
        assert_eq!(truncate_to_digits(&dec("3.14159265"), 4), dec("3.1415"));
        assert_eq!(truncate_to_digits(&dec("3.19999"), 1), dec("3.1"));
        assert_eq!(truncate_to_digits(&dec("-2.789"), 2), dec("-2.78"));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 0.5\n"), Some(dec("0.5")));
        assert_eq!(parse_decimal("-1.25E-3"), Some(dec("-0.00125")));
        assert!(parse_decimal("").is_none());
        assert!(parse_decimal("   ").is_none());
        assert!(parse_decimal("NaN").is_none());
        assert!(parse_decimal("<html>").is_none());
    }
}
