//! pisum - Main CLI Entry Point

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use pisum::cli::{Args, Config, Verbosity};
use pisum::convergence::ConvergenceController;
use pisum::remote::{HttpSumClient, LocalSeriesClient, RemoteSumClient};
use pisum::telemetry::{RunSummary, TelemetryCollector, TelemetryDisplay};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    let verbosity = if args.quiet || args.verbose > 0 {
        args.verbosity()
    } else {
        config.verbosity()
    };
    init_logging(verbosity);

    if !config.output.color {
        colored::control::set_override(false);
    }

    config
        .apply_args(&args)
        .context("Invalid command-line options")?;

    let controller_config = config.controller_config();
    let ctx = controller_config.precision.working();

    let client: Arc<dyn RemoteSumClient> = if args.local {
        Arc::new(LocalSeriesClient::new(ctx))
    } else {
        Arc::new(HttpSumClient::with_config(
            &config.base_url(),
            &config.server.path,
            config.request_timeout(),
            ctx,
        )?)
    };
    info!(service = %client.describe(), "using partial-sum service");

    let telemetry = TelemetryCollector::new();
    let display = TelemetryDisplay::new(telemetry.clone(), verbosity);
    let tail_correction = controller_config.tail_correction;

    let controller = ConvergenceController::new(controller_config, client)?.with_telemetry(telemetry);
    let started_at = Utc::now();

    let outcome = controller
        .run_with(|report| {
            if !args.json {
                display.show_iteration(report.iteration, &report.delta.to_string());
            }
        })
        .await
        .context("Run failed, no result produced")?;

    if args.json {
        let summary = RunSummary {
            run_id: outcome.run_id.clone(),
            digits: outcome.precision.digits(),
            result: outcome.value.to_string(),
            iterations: outcome.iterations,
            terms_evaluated: outcome.terms_evaluated(),
            final_delta: outcome.final_delta.to_string(),
            tail_correction: tail_correction.to_string(),
            started_at,
            finished_at: Utc::now(),
        };
        display.show_json(&summary)?;
    } else {
        display.show_result(&outcome.value.to_string());
        display.display_summary();
    }

    Ok(())
}
