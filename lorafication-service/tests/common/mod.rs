//! Test helpers for lorafication-service integration tests.
//!
//! Drives the real router in-process against the in-memory store and the
//! mock email provider.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use lorafication_service::{
    build_router,
    config::{DatabaseConfig, LoraficationConfig, SmtpConfig},
    models::{NewEntity, Node},
    services::{ContractStore, CredentialStore, MockEmailProvider, MockStore},
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_config() -> LoraficationConfig {
    LoraficationConfig {
        server: service_core::config::Config {
            port: 0,
            ..Default::default()
        },
        database: DatabaseConfig::default(),
        smtp: SmtpConfig::default(),
        otlp_endpoint: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockStore>,
    pub mailer: Arc<MockEmailProvider>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub raw: Vec<u8>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(MockEmailProvider::new(true))
    }

    pub fn with_mailer(mailer: MockEmailProvider) -> Self {
        let store = Arc::new(MockStore::new());
        let mailer = Arc::new(mailer);
        let state = AppState::new(test_config(), store.clone(), mailer.clone());

        Self {
            router: build_router(state),
            store,
            mailer,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let raw = response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse { status, body, raw }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(&body.to_string())).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    /// Register a node directly in the store.
    pub async fn node(&self, name: &str) -> Node {
        self.store.create_node(name, "").await.unwrap()
    }

    /// Register an entity and subscribe it to `node`.
    pub async fn subscribe(&self, node: &Node, email: Option<&str>, sms: Option<i64>) {
        let entity = self
            .store
            .create_entity(&NewEntity::new("E", email.map(str::to_string), sms).unwrap())
            .await
            .unwrap();
        self.store
            .create_contract(node.public_key, entity.id)
            .await
            .unwrap();
    }
}

pub fn notify_body(node: &Node, message: &str) -> Value {
    serde_json::json!({
        "nodePublicKey": node.public_key.to_string(),
        "secret": node.secret.to_string(),
        "message": message,
    })
}

/// The single error message in an error envelope.
pub fn error_message(body: &Value) -> &str {
    body["errors"][0]["message"].as_str().unwrap_or_default()
}
