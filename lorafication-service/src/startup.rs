//! Application startup and lifecycle management.

use crate::config::LoraficationConfig;
use crate::handlers;
use crate::services::{
    Database, Dispatcher, EmailProvider, MockEmailProvider, Notifier, Resolver, SmtpProvider,
    Store,
};
use axum::{
    error_handling::HandleErrorLayer,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::any::Any;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: LoraficationConfig,
    pub store: Arc<dyn Store>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(
        config: LoraficationConfig,
        store: Arc<dyn Store>,
        email_provider: Arc<dyn EmailProvider>,
    ) -> Self {
        let notifier = Notifier::new(Resolver::new(store.clone()), Dispatcher::new(email_provider));

        Self {
            config,
            store,
            notifier,
        }
    }
}

/// Route table plus the shared middleware stack.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.server.request_timeout();

    let router = Router::new()
        .route("/node", post(handlers::create_node))
        .route("/entity", post(handlers::create_entity))
        .route("/contract", post(handlers::create_contract))
        .route("/notify", post(handlers::notify))
        .route("/ready", get(handlers::ready))
        .route("/healthy", get(handlers::healthy))
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::fallback)
        .with_state(state);

    with_middleware(router, request_timeout)
}

/// Request-id tagging is outermost, so panics and timeouts are logged and
/// answered with the id like any other response.
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(request_timeout),
        )
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout.into_response()
    } else {
        AppError::InternalError(anyhow::anyhow!("unhandled middleware error: {}", err))
            .into_response()
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::InternalError(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to Postgres, apply the schema, pick the mail provider and bind
    /// the listener.
    pub async fn build(config: LoraficationConfig) -> Result<Self, AppError> {
        let db = Database::connect(&config.database).await.map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;

        db.apply_schema().await.map_err(|e| {
            tracing::error!("Failed to apply database schema: {}", e);
            e
        })?;

        let email_provider: Arc<dyn EmailProvider> = if config.smtp.enabled {
            let provider = SmtpProvider::new(config.smtp.clone()).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("initialize SMTP provider: {}", e))
            })?;
            tracing::info!(host = %config.smtp.host, "SMTP email provider initialized");
            Arc::new(provider)
        } else {
            tracing::info!("SMTP provider disabled, using mock email provider");
            Arc::new(MockEmailProvider::new(true))
        };

        Self::build_with(config, Arc::new(db), email_provider).await
    }

    /// Bind the listener around an already constructed store and provider.
    pub async fn build_with(
        config: LoraficationConfig,
        store: Arc<dyn Store>,
        email_provider: Arc<dyn EmailProvider>,
    ) -> Result<Self, AppError> {
        let host = config.server.host.as_str();
        let listener = TcpListener::bind((host, config.server.port))
            .await
            .map_err(|e| {
                tracing::error!("Failed to bind listener to {}:{}: {}", host, config.server.port, e);
                AppError::from(e)
            })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            host = %host,
            port,
            email_enabled = email_provider.is_enabled(),
            "Listening"
        );

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, store, email_provider),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then give in-flight requests up to
    /// the configured shutdown timeout to finish.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let grace = self.state.config.server.shutdown_timeout();
        let router = build_router(self.state);

        let stopping = Arc::new(Notify::new());
        let signalled = stopping.clone();

        let server = axum::serve(self.listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                signalled.notify_one();
            })
            .into_future();

        tokio::select! {
            result = server => {
                if let Err(e) = &result {
                    tracing::error!("HTTP server error: {}", e);
                }
                result?;
            }
            _ = async {
                stopping.notified().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "shutdown timeout elapsed, dropping in-flight requests"
                );
            }
        }

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use service_core::middleware::REQUEST_ID_HEADER;
    use tower::ServiceExt;

    async fn panics() -> &'static str {
        panic!("boom")
    }

    async fn stalls() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    fn app() -> Router {
        let router = Router::new()
            .route("/panic", get(panics))
            .route("/slow", get(stalls));
        with_middleware(router, Duration::from_millis(50))
    }

    async fn call(uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(REQUEST_ID_HEADER, "req-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        (status, request_id, body)
    }

    #[tokio::test]
    async fn panic_gets_envelope_and_request_id() {
        let (status, request_id, body) = call("/panic").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(request_id.as_deref(), Some("req-7"));
        assert_eq!(body["errors"][0]["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn timeout_gets_envelope_and_request_id() {
        let (status, request_id, body) = call("/slow").await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(request_id.as_deref(), Some("req-7"));
        assert_eq!(body["errors"][0]["message"], "Request Timeout");
        assert!(body["results"].is_null());
    }
}
