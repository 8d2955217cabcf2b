//! Convergence loop type definitions

use crate::aggregation::DEFAULT_WORKER_COUNT;
use crate::arithmetic::Precision;
use crate::errors::{PiError, Result};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference number of terms evaluated per iteration
pub const DEFAULT_STEP_SIZE: u64 = 100_000;

/// Default iteration bound
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000;

/// How the extrapolated tail term is applied to `primary_sum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailCorrection {
    /// Subtract `4 / (2N - 1)` unconditionally (reference behaviour)
    #[default]
    Magnitude,

    /// Subtract the last evaluated term with its sign, giving the partial
    /// sum one term shorter. Always on the other side of pi.
    Alternating,
}

impl fmt::Display for TailCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TailCorrection::Alternating => write!(f, "alternating"),
            TailCorrection::Magnitude => write!(f, "magnitude"),
        }
    }
}

impl FromStr for TailCorrection {
    type Err = PiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alternating" => Ok(TailCorrection::Alternating),
            "magnitude" => Ok(TailCorrection::Magnitude),
            other => Err(PiError::ConfigError(format!(
                "Unknown tail correction: {}",
                other
            ))),
        }
    }
}

/// Options for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub precision: Precision,
    pub step_size: u64,
    pub worker_count: usize,
    pub max_iterations: u64,
    pub tail_correction: TailCorrection,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            step_size: DEFAULT_STEP_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tail_correction: TailCorrection::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_digits(digits: u32) -> Self {
        Self {
            precision: Precision::new(digits),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 || self.step_size < self.worker_count as u64 {
            return Err(PiError::InvalidPartition {
                step: self.step_size,
                workers: self.worker_count,
            });
        }
        if self.max_iterations == 0 {
            return Err(PiError::ConfigError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accumulator state owned by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct RunningEstimate {
    /// Sum of every evaluated partial sum
    pub primary_sum: BigDecimal,
    /// `primary_sum` minus the extrapolated tail term
    pub corrected_sum: BigDecimal,
    /// Next unevaluated term index
    pub offset: u64,
    pub step_size: u64,
}

impl RunningEstimate {
    pub fn new(step_size: u64) -> Self {
        Self {
            primary_sum: BigDecimal::zero(),
            corrected_sum: BigDecimal::zero(),
            offset: 0,
            step_size,
        }
    }
}

/// What one iteration produced
#[derive(Debug, Clone)]
pub struct StepReport {
    pub iteration: u64,
    pub offset: u64,
    pub delta: BigDecimal,
    pub primary_sum: BigDecimal,
    pub corrected_sum: BigDecimal,
    pub converged: bool,
}

/// Result of a converged run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    /// Truncated to `precision.digits()` decimal places
    pub value: BigDecimal,
    pub precision: Precision,
    pub iterations: u64,
    pub final_delta: BigDecimal,
    pub estimate: RunningEstimate,
}

impl RunOutcome {
    pub fn terms_evaluated(&self) -> u64 {
        self.estimate.offset
    }
}
