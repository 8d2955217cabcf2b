//! Leibniz series for pi
//!
//! Term index `i` starts at 0 and `t(i) = (-1)^i * 4 / (2i + 1)`, so the
//! first terms are `4 - 4/3 + 4/5 - ...`. A range `[start, end)` covers
//! `t(start)` through `t(end - 1)`.

use crate::arithmetic::WorkingPrecision;
use crate::errors::Result;
use bigdecimal::{BigDecimal, Zero};

/// Sign of term `index`
pub fn term_sign(index: u64) -> i8 {
    if index % 2 == 0 {
        1
    } else {
        -1
    }
}

/// Signed value of term `index`
pub fn term(index: u64, ctx: &WorkingPrecision) -> Result<BigDecimal> {
    let magnitude = term_magnitude(index, ctx)?;
    Ok(if term_sign(index) > 0 {
        magnitude
    } else {
        -magnitude
    })
}

/// `4 / (2i + 1)` at working precision
pub fn term_magnitude(index: u64, ctx: &WorkingPrecision) -> Result<BigDecimal> {
    let denominator = BigDecimal::from(2 * index + 1);
    ctx.divide(&BigDecimal::from(4), &denominator)
}

/// Magnitude used as the tail error bound once `[0, evaluated)` is summed
///
/// This is `4 / (2N - 1)`, the size of the last evaluated term. Zero when
/// nothing has been evaluated yet.
pub fn tail_bound(evaluated: u64, ctx: &WorkingPrecision) -> Result<BigDecimal> {
    if evaluated == 0 {
        return Ok(BigDecimal::zero());
    }
    let denominator = BigDecimal::from(2 * evaluated - 1);
    ctx.divide(&BigDecimal::from(4), &denominator)
}

/// Sum the terms in `[start, end)`, rounding each step to `ctx`
pub fn partial_sum(start: u64, end: u64, ctx: &WorkingPrecision) -> Result<BigDecimal> {
    let mut total = BigDecimal::zero();
    for index in start..end {
        total = ctx.add(&total, &term(index, ctx)?);
    }
    Ok(total)
}
