//! Range partitioning for parallel evaluation
//!
//! Splits one step `[offset, offset + step)` into contiguous sub-ranges, one
//! per worker. Integer-division remainder goes to the last sub-range so the
//! union covers every term exactly once.

use crate::errors::{PiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open interval of series term indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRange {
    start: u64,
    end: u64,
}

impl SeriesRange {
    /// Create a range, requiring `end > start`
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end <= start {
            return Err(PiError::InvalidPartition {
                step: end.saturating_sub(start),
                workers: 1,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of terms covered
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Never true for ranges built by this module
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl fmt::Display for SeriesRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Split `[offset, offset + step)` into `workers` contiguous sub-ranges
///
/// Requires `step >= workers > 0`. All sub-ranges have `step / workers`
/// terms except the last, which also takes `step % workers`.
pub fn partition(offset: u64, step: u64, workers: usize) -> Result<Vec<SeriesRange>> {
    if workers == 0 || step < workers as u64 {
        return Err(PiError::InvalidPartition { step, workers });
    }

    let count = workers as u64;
    let chunk = step / count;
    let end = offset + step;

    let ranges = (0..count)
        .map(|i| {
            let start = offset + i * chunk;
            let stop = if i == count - 1 { end } else { start + chunk };
            SeriesRange { start, end: stop }
        })
        .collect();

    Ok(ranges)
}
