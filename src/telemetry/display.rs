//! Console output for a run
//!
//! Per-iteration error estimates and the final result banner. This is
//! diagnostic output, not a stable format; `RunSummary` is the structured
//! alternative printed with `--json`.

use crate::cli::Verbosity;
use crate::errors::Result;
use crate::telemetry::TelemetryCollector;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

const BANNER_WIDTH: usize = 74;
const RESULT_PREFIX: &str = "-----------------------------RESULT IS HERE: ";
const RESULT_SUFFIX: &str = "--------------------";

/// Structured outcome of one converged run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub digits: u32,
    pub result: String,
    pub iterations: u64,
    pub terms_evaluated: u64,
    pub final_delta: String,
    pub tail_correction: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Lines of the result banner
pub fn render_banner(result: &str) -> Vec<String> {
    vec![
        "/".repeat(BANNER_WIDTH),
        "-".repeat(BANNER_WIDTH),
        format!("{}{}{}", RESULT_PREFIX, result, RESULT_SUFFIX),
        "-".repeat(BANNER_WIDTH),
        "/".repeat(BANNER_WIDTH),
    ]
}

/// Terminal display bound to a collector
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: Verbosity,
}

impl TelemetryDisplay {
    pub fn new(collector: TelemetryCollector, verbosity: Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// One line per iteration with the current error estimate
    pub fn show_iteration(&self, iteration: u64, delta: &str) {
        if !self.verbosity.show_progress() {
            return;
        }
        if self.verbosity.show_events() {
            println!("{} sub={}", format!("[{:>4}]", iteration).dimmed(), delta);
        } else {
            println!("sub={}", delta);
        }
    }

    /// Final result framed by banner lines
    pub fn show_result(&self, result: &str) {
        let lines = render_banner(result);
        for (i, line) in lines.iter().enumerate() {
            if i == 2 {
                println!("{}", line.bold().green());
            } else {
                println!("{}", line);
            }
        }
    }

    pub fn show_json(&self, summary: &RunSummary) -> Result<()> {
        println!("{}", summary.to_json()?);
        Ok(())
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.verbosity.show_events() {
            return;
        }
        let stats = self.collector.get_stats();

        println!();
        println!("Run Summary");
        println!("─────────────────────────────────────");
        println!("Duration:          {:?}", self.collector.elapsed());
        println!("Iterations:        {}", stats.iterations);
        println!("Terms evaluated:   {}", stats.terms_evaluated);
        println!("Ranges dispatched: {}", stats.ranges_dispatched);
        println!(
            "Success rate:      {:.1}%",
            self.collector.range_success_rate() * 100.0
        );
        println!("Slowest range:     {} ms", stats.slowest_range_ms);
        println!();
    }
}
