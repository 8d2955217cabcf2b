//! Telemetry for pisum runs
//!
//! Collects run and sub-range events and renders the diagnostic console
//! output.

pub mod display;

pub use display::{RunSummary, TelemetryDisplay};

use crate::partition::SeriesRange;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    // Run events
    RunStarted {
        run_id: String,
        digits: u32,
        timestamp: Instant,
    },
    IterationCompleted {
        iteration: u64,
        offset: u64,
        delta: String,
        timestamp: Instant,
    },
    RunConverged {
        iterations: u64,
        timestamp: Instant,
    },
    RunFailed {
        reason: String,
        timestamp: Instant,
    },

    // Sub-range events
    RangeDispatched {
        range: SeriesRange,
        timestamp: Instant,
    },
    RangeCompleted {
        range: SeriesRange,
        duration_ms: u64,
        timestamp: Instant,
    },
    RangeFailed {
        range: SeriesRange,
        reason: String,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub iterations: u64,
    pub ranges_dispatched: usize,
    pub ranges_completed: usize,
    pub ranges_failed: usize,
    pub terms_evaluated: u64,
    pub slowest_range_ms: u64,
    pub runs_converged: usize,
    pub runs_failed: usize,
}

/// Telemetry collector, cheap to clone into worker tasks
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::RunStarted { .. } => {}
                TelemetryEvent::IterationCompleted { iteration, .. } => {
                    stats.iterations = stats.iterations.max(*iteration);
                }
                TelemetryEvent::RunConverged { .. } => {
                    stats.runs_converged += 1;
                }
                TelemetryEvent::RunFailed { .. } => {
                    stats.runs_failed += 1;
                }
                TelemetryEvent::RangeDispatched { .. } => {
                    stats.ranges_dispatched += 1;
                }
                TelemetryEvent::RangeCompleted {
                    range, duration_ms, ..
                } => {
                    stats.ranges_completed += 1;
                    stats.terms_evaluated += range.len();
                    stats.slowest_range_ms = stats.slowest_range_ms.max(*duration_ms);
                }
                TelemetryEvent::RangeFailed { .. } => {
                    stats.ranges_failed += 1;
                }
            }
        }

        lock(&self.events).push(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Fraction of dispatched ranges that completed
    pub fn range_success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let total = stats.ranges_completed + stats.ranges_failed;
        if total == 0 {
            1.0
        } else {
            stats.ranges_completed as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
