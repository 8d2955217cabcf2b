//! Run state machine
//!
//! Valid transitions:
//! 1. Init      → Stepping   (on: Start)
//! 2. Stepping  → Stepping   (on: StepCompleted)
//! 3. Stepping  → Converged  (on: ThresholdReached)
//! 4. Stepping  → Failed     (on: Fail)
//! 5. Converged → Finalized  (on: Finalize)
//! 6. Finalized and Failed are terminal (self-loops)

use crate::errors::{PiError, Result};
use serde::{Deserialize, Serialize};

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Sums zeroed, nothing evaluated
    Init,

    /// Evaluating steps until the error estimate drops below threshold
    Stepping,

    /// Error estimate below threshold, result not yet rounded
    Converged,

    /// Result produced (terminal)
    Finalized,

    /// Run aborted without a result (terminal)
    Failed,
}

/// Events that drive the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    Start,
    StepCompleted,
    ThresholdReached,
    Finalize,
    Fail,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finalized | RunState::Failed)
    }

    /// Attempt a transition
    pub fn transition(&self, event: RunEvent) -> Result<RunState> {
        use RunEvent::*;
        use RunState::*;

        let next = match (self, event) {
            (Init, Start) => Stepping,

            (Stepping, StepCompleted) => Stepping,
            (Stepping, ThresholdReached) => Converged,
            (Stepping, Fail) => Failed,

            (Converged, Finalize) => Finalized,

            (Finalized, _) => Finalized,
            (Failed, _) => Failed,

            (from, event) => {
                return Err(PiError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }
}
