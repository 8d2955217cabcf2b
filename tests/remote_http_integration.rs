//! HTTP adapter and fatal-propagation tests against a mocked compute service

use pisum::arithmetic::{Precision, WorkingPrecision};
use pisum::convergence::{ConvergenceController, ControllerConfig, RunState};
use pisum::remote::{HttpSumClient, RemoteSumClient};
use pisum::{series, PiError, SeriesRange};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use bigdecimal::BigDecimal;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn ctx() -> WorkingPrecision {
    WorkingPrecision::new(20)
}

fn client_for(server: &MockServer) -> HttpSumClient {
    HttpSumClient::with_config(&server.uri(), "/compute_pi", Duration::from_secs(5), ctx()).unwrap()
}

/// Responder that evaluates the requested range like the real service
fn series_responder(request: &Request) -> ResponseTemplate {
    let param = |name: &str| {
        request
            .url
            .query_pairs()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.parse::<u64>().ok())
    };
    match (param("startIndex"), param("endIndex")) {
        (Some(start), Some(end)) => {
            let sum = series::partial_sum(start, end, &ctx()).unwrap();
            ResponseTemplate::new(200).set_body_string(sum.to_string())
        }
        _ => ResponseTemplate::new(400).set_body_string("missing range"),
    }
}

#[tokio::test]
async fn test_request_contract() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/compute_pi"))
        .and(query_param("startIndex", "10"))
        .and(query_param("endIndex", "20"))
        .and(header("Accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0.0123\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = client
        .partial_sum(SeriesRange::new(10, 20).unwrap())
        .await
        .unwrap();

    assert_eq!(value, BigDecimal::from_str("0.0123").unwrap());
}

#[tokio::test]
async fn test_non_numeric_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .partial_sum(SeriesRange::new(0, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, PiError::MalformedResponse { start: 0, end: 5, .. }));
}

#[tokio::test]
async fn test_empty_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .partial_sum(SeriesRange::new(0, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, PiError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_error_status_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .partial_sum(SeriesRange::new(0, 5).unwrap())
        .await
        .unwrap_err();

    match err {
        PiError::Transport { reason, .. } => assert!(reason.contains("500")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let client =
        HttpSumClient::with_config(&uri, "/compute_pi", Duration::from_secs(2), ctx()).unwrap();
    let err = client
        .partial_sum(SeriesRange::new(0, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, PiError::Transport { .. }));
}

#[tokio::test]
async fn test_run_over_http_converges() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/compute_pi"))
        .respond_with(series_responder)
        .mount(&server)
        .await;

    let config = ControllerConfig {
        precision: Precision::new(2),
        step_size: 300,
        ..Default::default()
    };
    let client: Arc<dyn RemoteSumClient> = Arc::new(client_for(&server));
    let controller = ConvergenceController::new(config, client).unwrap();

    let outcome = controller.run().await.unwrap();
    assert_eq!(outcome.value.to_string(), "3.13");
    assert_eq!(outcome.terms_evaluated(), 300);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_one_failed_range_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("startIndex", "10"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(series_responder)
        .mount(&server)
        .await;

    let config = ControllerConfig {
        precision: Precision::new(4),
        step_size: 30,
        ..Default::default()
    };
    let client: Arc<dyn RemoteSumClient> = Arc::new(client_for(&server));
    let mut controller = ConvergenceController::new(config, client).unwrap();

    let err = controller.step().await.unwrap_err();
    assert!(err.is_computation_error());
    assert_eq!(controller.state(), RunState::Failed);
    assert_eq!(controller.iterations(), 0);
    assert_eq!(controller.telemetry().get_stats().runs_failed, 1);
}
