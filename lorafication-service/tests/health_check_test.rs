//! Health, metrics and routing tests.

mod common;

use common::{error_message, test_config, TestApp};
use lorafication_service::{
    services::{MockEmailProvider, MockStore},
    Application,
};
use service_core::middleware::REQUEST_ID_HEADER;
use std::sync::Arc;

#[tokio::test]
async fn ready_and_healthy_return_200() {
    let app = TestApp::new();

    assert_eq!(app.get("/ready").await.status, 200);
    assert_eq!(app.get("/healthy").await.status, 200);
}

#[tokio::test]
async fn probes_return_500_when_store_is_down() {
    let app = TestApp::new();
    app.store.set_unavailable(true);

    assert_eq!(app.get("/ready").await.status, 500);
    assert_eq!(app.get("/healthy").await.status, 500);
}

#[tokio::test]
async fn unknown_route_returns_404_envelope() {
    let app = TestApp::new();

    let response = app.get("/does-not-exist").await;

    assert_eq!(response.status, 404);
    assert_eq!(error_message(&response.body), "Not Found");
    assert!(response.body["results"].is_null());
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let app = TestApp::new();

    let response = app.get("/metrics").await;

    // No recorder is installed in this binary; see metrics_test.rs.
    assert_eq!(response.status, 200);
    assert_eq!(
        String::from_utf8(response.raw).unwrap(),
        "# Metrics recorder not initialized\n"
    );
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ready")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");
}

#[tokio::test]
async fn application_binds_an_ephemeral_port_and_stops() {
    let app = Application::build_with(
        test_config(),
        Arc::new(MockStore::new()),
        Arc::new(MockEmailProvider::new(true)),
    )
    .await
    .expect("Failed to build application");

    assert_ne!(app.port(), 0);
    app.run_until(async {}).await.expect("server error");
}
