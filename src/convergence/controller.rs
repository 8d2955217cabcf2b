//! Convergence controller
//!
//! Drives the summation loop: grow the evaluated range one step at a time,
//! extrapolate the tail from the last evaluated term, and stop once the
//! tail estimate falls below `10^-digits`.

use crate::aggregation::ParallelAggregator;
use crate::arithmetic::WorkingPrecision;
use crate::convergence::state::{RunEvent, RunState};
use crate::convergence::types::{
    ControllerConfig, RunOutcome, RunningEstimate, StepReport, TailCorrection,
};
use crate::errors::{PiError, Result};
use crate::finalize::finalize;
use crate::partition::partition;
use crate::remote::RemoteSumClient;
use crate::series;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use bigdecimal::{BigDecimal, Zero};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Owns the running estimate for exactly one run
pub struct ConvergenceController {
    config: ControllerConfig,
    ctx: WorkingPrecision,
    aggregator: ParallelAggregator,
    threshold: BigDecimal,
    state: RunState,
    estimate: RunningEstimate,
    iterations: u64,
    last_delta: Option<BigDecimal>,
    telemetry: TelemetryCollector,
    run_id: Uuid,
}

impl ConvergenceController {
    /// Create a controller in `Init`
    pub fn new(config: ControllerConfig, client: Arc<dyn RemoteSumClient>) -> Result<Self> {
        config.validate()?;

        let ctx = config.precision.working();
        let telemetry = TelemetryCollector::new();
        let aggregator = ParallelAggregator::with_workers(client, config.worker_count, ctx)
            .with_telemetry(telemetry.clone());

        Ok(Self {
            threshold: config.precision.threshold(),
            estimate: RunningEstimate::new(config.step_size),
            config,
            ctx,
            aggregator,
            state: RunState::Init,
            iterations: 0,
            last_delta: None,
            telemetry,
            run_id: Uuid::new_v4(),
        })
    }

    /// Replace the telemetry collector (shared with the aggregator)
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.aggregator = self.aggregator.with_telemetry(telemetry.clone());
        self.telemetry = telemetry;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn estimate(&self) -> &RunningEstimate {
        &self.estimate
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn run_id(&self) -> String {
        self.run_id.to_string()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    fn apply(&mut self, event: RunEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "state transition");
        }
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, err: PiError) -> PiError {
        self.state = self.state.transition(RunEvent::Fail).unwrap_or(RunState::Failed);
        self.telemetry.record(TelemetryEvent::RunFailed {
            reason: err.to_string(),
            timestamp: Instant::now(),
        });
        err
    }

    /// Evaluate one step and update the estimate
    pub async fn step(&mut self) -> Result<StepReport> {
        if self.state == RunState::Init {
            self.apply(RunEvent::Start)?;
        }
        if self.state != RunState::Stepping {
            return Err(PiError::InvalidTransition {
                from: format!("{:?}", self.state),
                event: format!("{:?}", RunEvent::StepCompleted),
            });
        }

        let ranges = partition(
            self.estimate.offset,
            self.estimate.step_size,
            self.config.worker_count,
        )?;

        let partial = match self.aggregator.evaluate(&ranges).await {
            Ok(value) => value,
            Err(e) => return Err(self.fail(e)),
        };

        let ctx = self.ctx;
        let primary = ctx.add(&self.estimate.primary_sum, &partial);
        let evaluated = self.estimate.offset + self.estimate.step_size;

        // delta = |primary - corrected| = tail magnitude under either policy
        let magnitude = series::tail_bound(evaluated, &ctx)?;
        let delta = magnitude.clone();
        let correction = match self.config.tail_correction {
            TailCorrection::Alternating if series::term_sign(evaluated - 1) < 0 => -magnitude,
            _ => magnitude,
        };
        let corrected = ctx.subtract(&primary, &correction);

        self.estimate.primary_sum = primary;
        self.estimate.corrected_sum = corrected;
        self.estimate.offset = evaluated;
        self.iterations += 1;
        self.last_delta = Some(delta.clone());

        let converged = delta < self.threshold;
        self.apply(if converged {
            RunEvent::ThresholdReached
        } else {
            RunEvent::StepCompleted
        })?;

        self.telemetry.record(TelemetryEvent::IterationCompleted {
            iteration: self.iterations,
            offset: evaluated,
            delta: delta.to_string(),
            timestamp: Instant::now(),
        });
        debug!(
            iteration = self.iterations,
            offset = evaluated,
            delta = %delta,
            converged,
            "step evaluated"
        );

        Ok(StepReport {
            iteration: self.iterations,
            offset: evaluated,
            delta,
            primary_sum: self.estimate.primary_sum.clone(),
            corrected_sum: self.estimate.corrected_sum.clone(),
            converged,
        })
    }

    /// Run to convergence
    pub async fn run(self) -> Result<RunOutcome> {
        self.run_with(|_| {}).await
    }

    /// Run to convergence, calling `on_step` after every iteration
    pub async fn run_with<F>(mut self, mut on_step: F) -> Result<RunOutcome>
    where
        F: FnMut(&StepReport),
    {
        let span = info_span!("run", run_id = %self.run_id);

        async move {
            info!(
                digits = self.config.precision.digits(),
                step_size = self.config.step_size,
                workers = self.config.worker_count,
                threshold_estimate = self.config.precision.threshold_estimate(),
                working_digits = self.ctx.significant_digits(),
                "starting run"
            );
            self.telemetry.record(TelemetryEvent::RunStarted {
                run_id: self.run_id.to_string(),
                digits: self.config.precision.digits(),
                timestamp: Instant::now(),
            });

            loop {
                let report = self.step().await?;
                on_step(&report);

                if report.converged {
                    break;
                }
                if self.iterations >= self.config.max_iterations {
                    warn!(
                        iterations = self.iterations,
                        delta = %report.delta,
                        "iteration bound reached before convergence"
                    );
                    let err = PiError::NotConverged {
                        iterations: self.iterations,
                        delta: report.delta.to_string(),
                    };
                    return Err(self.fail(err));
                }
            }

            self.finish()
        }
        .instrument(span)
        .await
    }

    fn finish(mut self) -> Result<RunOutcome> {
        let value = finalize(
            &self.estimate.primary_sum,
            &self.estimate.corrected_sum,
            self.config.precision,
            &self.ctx,
        )?;
        self.apply(RunEvent::Finalize)?;

        self.telemetry.record(TelemetryEvent::RunConverged {
            iterations: self.iterations,
            timestamp: Instant::now(),
        });
        info!(
            iterations = self.iterations,
            terms = self.estimate.offset,
            result = %value,
            "run converged"
        );

        Ok(RunOutcome {
            run_id: self.run_id.to_string(),
            value,
            precision: self.config.precision,
            iterations: self.iterations,
            final_delta: self.last_delta.take().unwrap_or_else(BigDecimal::zero),
            estimate: self.estimate,
        })
    }
}
