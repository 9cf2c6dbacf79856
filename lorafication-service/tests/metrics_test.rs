//! Prometheus output tests.
//!
//! The recorder is process-global, so everything that needs it lives in this
//! one test binary and one test.

mod common;

use common::{notify_body, TestApp};
use lorafication_service::services::init_metrics;

#[tokio::test]
async fn notify_outcomes_are_rendered_on_metrics() {
    // Arrange
    init_metrics().expect("Failed to install metrics recorder");
    let app = TestApp::new();
    let node = app.node("N1").await;
    app.subscribe(&node, Some("a@x.com"), None).await;

    // Act
    let notify = app.post("/notify", notify_body(&node, "hi")).await;
    let response = app.get("/metrics").await;

    // Assert
    assert_eq!(notify.status, 204);
    assert_eq!(response.status, 200);

    let rendered = String::from_utf8(response.raw).expect("metrics output is not UTF-8");
    assert!(
        rendered.contains(r#"lorafication_notifications_total{status="sent"} 1"#),
        "missing notification counter in:\n{rendered}"
    );
    assert!(
        rendered.contains(r#"lorafication_emails_sent_total{status="sent"} 1"#),
        "missing email counter in:\n{rendered}"
    );
    assert!(
        rendered.contains("http_requests_total"),
        "missing http counter in:\n{rendered}"
    );
}
