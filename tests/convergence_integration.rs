//! End-to-end convergence tests with the in-process evaluator

use bigdecimal::BigDecimal;
use pisum::arithmetic::Precision;
use pisum::convergence::{ConvergenceController, ControllerConfig, RunState, TailCorrection};
use pisum::remote::{LocalSeriesClient, RemoteSumClient};
use pisum::telemetry::TelemetryCollector;
use std::str::FromStr;
use std::sync::Arc;

fn local_client(config: &ControllerConfig) -> Arc<dyn RemoteSumClient> {
    Arc::new(LocalSeriesClient::new(config.precision.working()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn test_reference_scenario_one_digit() {
    let config = ControllerConfig::with_digits(1);
    assert_eq!(config.step_size, 100_000);
    assert_eq!(config.worker_count, 3);

    let telemetry = TelemetryCollector::new();
    let controller = ConvergenceController::new(config.clone(), local_client(&config))
        .unwrap()
        .with_telemetry(telemetry.clone());

    let outcome = controller.run().await.unwrap();

    // 4 / 199999 < 0.1 after the first step
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.value.to_string(), "3.1");

    let stats = telemetry.get_stats();
    assert_eq!(stats.ranges_dispatched, 3);
    assert_eq!(stats.terms_evaluated, 100_000);
    assert_eq!(stats.runs_converged, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn test_reference_scenario_alternating_policy() {
    let mut config = ControllerConfig::with_digits(1);
    config.tail_correction = TailCorrection::Alternating;

    let outcome = ConvergenceController::new(config.clone(), local_client(&config))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.value.to_string(), "3.1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn test_default_run_matches_reference_output() {
    let config = ControllerConfig::default();
    assert_eq!(config.precision.digits(), 5);
    assert_eq!(config.tail_correction, TailCorrection::Magnitude);

    let outcome = ConvergenceController::new(config.clone(), local_client(&config))
        .unwrap()
        .run()
        .await
        .unwrap();

    // 4 / (2N - 1) < 1e-5 first holds at N = 300000
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.value.to_string(), "3.14158");
}

#[tokio::test]
async fn test_iteration_count_is_deterministic() {
    // 4 / (2N - 1) < 0.001 first holds at N = 2001, i.e. after 3 steps of 700
    let config = ControllerConfig {
        precision: Precision::new(3),
        step_size: 700,
        tail_correction: TailCorrection::Alternating,
        ..Default::default()
    };

    let mut deltas = Vec::new();
    let outcome = ConvergenceController::new(config.clone(), local_client(&config))
        .unwrap()
        .run_with(|report| deltas.push(report.delta.clone()))
        .await
        .unwrap();

    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.terms_evaluated(), 2100);
    assert_eq!(outcome.value.to_string(), "3.141");
    assert!(deltas.windows(2).all(|w| w[1] <= w[0]));
}

#[tokio::test]
async fn test_averaged_result_beats_primary_sum() {
    let config = ControllerConfig {
        precision: Precision::new(3),
        step_size: 2400,
        tail_correction: TailCorrection::Alternating,
        ..Default::default()
    };
    let pi = BigDecimal::from_str("3.14159265358979323846").unwrap();

    let mut controller = ConvergenceController::new(config.clone(), local_client(&config)).unwrap();
    let report = controller.step().await.unwrap();
    assert!(report.converged);
    assert_eq!(controller.state(), RunState::Converged);

    let ctx = config.precision.working();
    let midpoint = ctx
        .divide(&ctx.add(&report.primary_sum, &report.corrected_sum), &BigDecimal::from(2))
        .unwrap();

    let primary_error = (&report.primary_sum - &pi).abs();
    let midpoint_error = (&midpoint - &pi).abs();
    assert!(midpoint_error < primary_error);
}
