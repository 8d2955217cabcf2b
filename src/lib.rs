//! pisum - parallel Leibniz approximation of pi
//!
//! Sums the series `4 - 4/3 + 4/5 - ...` in fixed-size steps, evaluating each
//! step's sub-ranges concurrently on a remote compute service, and stops once
//! the alternating-series tail bound drops below `10^-digits`.
//!
//! # Architecture
//!
//! - **arithmetic**: fixed-precision decimal operations
//! - **partition**: step → contiguous sub-ranges
//! - **remote**: partial-sum client seam (HTTP and in-process)
//! - **aggregation**: bounded parallel fan-out and join
//! - **convergence**: the stepping loop and its state machine
//! - **finalize**: averaging and truncation of the result

pub mod errors;
pub mod arithmetic;
pub mod series;
pub mod partition;
pub mod remote;
pub mod aggregation;
pub mod convergence;
pub mod finalize;
pub mod telemetry;
pub mod cli;

// Re-export commonly used types
pub use errors::{PiError, Result};
pub use arithmetic::{Precision, WorkingPrecision};
pub use partition::{partition, SeriesRange};
pub use remote::{HttpSumClient, LocalSeriesClient, RemoteSumClient};
pub use aggregation::ParallelAggregator;
pub use convergence::{ConvergenceController, ControllerConfig, RunOutcome, TailCorrection};
pub use finalize::finalize;
