//! Parallel aggregation of sub-range sums
//!
//! Each call to [`ParallelAggregator::evaluate`] builds a fresh worker pool
//! bounded to `worker_count`, dispatches one request per range and joins on
//! all of them. Results are folded in arrival order. The first failure aborts
//! the step; siblings still in flight are abandoned with the pool.
//! Workers share only the semaphore; telemetry is written by the joining task.

use crate::arithmetic::WorkingPrecision;
use crate::errors::{PiError, Result};
use crate::partition::SeriesRange;
use crate::remote::RemoteSumClient;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use bigdecimal::{BigDecimal, Zero};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Reference fan-out width
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Fans ranges out to a [`RemoteSumClient`] and sums the answers
pub struct ParallelAggregator {
    client: Arc<dyn RemoteSumClient>,
    worker_count: usize,
    ctx: WorkingPrecision,
    telemetry: TelemetryCollector,
}

impl ParallelAggregator {
    /// Create aggregator with the reference fan-out
    pub fn new(client: Arc<dyn RemoteSumClient>, ctx: WorkingPrecision) -> Self {
        Self::with_workers(client, DEFAULT_WORKER_COUNT, ctx)
    }

    /// Create aggregator with a custom fan-out (min 1)
    pub fn with_workers(
        client: Arc<dyn RemoteSumClient>,
        worker_count: usize,
        ctx: WorkingPrecision,
    ) -> Self {
        Self {
            client,
            worker_count: worker_count.max(1),
            ctx,
            telemetry: TelemetryCollector::new(),
        }
    }

    /// Share a telemetry collector with the caller
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    /// Sum of the partial sums over every range
    ///
    /// Blocks until all requests finish or one fails. No partial total is
    /// ever returned.
    pub async fn evaluate(&self, ranges: &[SeriesRange]) -> Result<BigDecimal> {
        let pool = Arc::new(Semaphore::new(self.worker_count));

        let mut pending: FuturesUnordered<_> = ranges
            .iter()
            .copied()
            .map(|range| {
                let pool = Arc::clone(&pool);
                let client = Arc::clone(&self.client);

                self.telemetry.record(TelemetryEvent::RangeDispatched {
                    range,
                    timestamp: Instant::now(),
                });

                let handle = tokio::spawn(async move {
                    let _permit = pool
                        .acquire_owned()
                        .await
                        .map_err(|e| PiError::WorkerFailed(e.to_string()))?;

                    let started = Instant::now();
                    let result = client.partial_sum(range).await;
                    Ok::<_, PiError>((started.elapsed(), result))
                });

                async move { (range, handle.await) }
            })
            .collect();

        let mut total = BigDecimal::zero();
        while let Some((range, joined)) = pending.next().await {
            let outcome = match joined {
                Ok(Ok((elapsed, result))) => result.map(|value| (elapsed, value)),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(PiError::WorkerFailed(format!("{}: {}", range, e))),
            };

            let partial = match outcome {
                Ok((elapsed, value)) => {
                    self.telemetry.record(TelemetryEvent::RangeCompleted {
                        range,
                        duration_ms: elapsed.as_millis() as u64,
                        timestamp: Instant::now(),
                    });
                    value
                }
                Err(e) => {
                    self.telemetry.record(TelemetryEvent::RangeFailed {
                        range,
                        reason: e.to_string(),
                        timestamp: Instant::now(),
                    });
                    warn!(range = %range, error = %e, "sub-range evaluation failed, aborting step");
                    return Err(e);
                }
            };
            debug!(range = %range, partial = %partial, "sub-range folded");
            total = self.ctx.add(&total, &partial);
        }

        Ok(total)
    }
}
