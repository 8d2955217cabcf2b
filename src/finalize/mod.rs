//! Result finalization
//!
//! Averages the two bracketing estimates and truncates to the requested
//! number of decimal places. Truncation can under-report the true value by
//! one unit in the last digit; that matches the reference output.

use crate::arithmetic::{truncate_to_digits, Precision, WorkingPrecision};
use crate::errors::Result;
use bigdecimal::BigDecimal;

/// `(primary + corrected) / 2`, truncated to `precision.digits()` places
pub fn finalize(
    primary: &BigDecimal,
    corrected: &BigDecimal,
    precision: Precision,
    ctx: &WorkingPrecision,
) -> Result<BigDecimal> {
    let midpoint = ctx.divide(&ctx.add(primary, corrected), &BigDecimal::from(2))?;
    Ok(truncate_to_digits(&midpoint, precision.digits()))
}
