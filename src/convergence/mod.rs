//! Convergence control for the series summation
//!
//! State machine, running estimate and the controller that drives the loop.

pub mod controller;
pub mod state;
pub mod types;

pub use controller::ConvergenceController;
pub use state::{RunEvent, RunState};
pub use types::{
    ControllerConfig, RunOutcome, RunningEstimate, StepReport, TailCorrection,
    DEFAULT_MAX_ITERATIONS, DEFAULT_STEP_SIZE,
};
