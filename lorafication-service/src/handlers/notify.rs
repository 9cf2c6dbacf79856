use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::web::JsonBody;
use tracing::instrument;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    #[serde(rename = "nodePublicKey")]
    pub node_public_key: String,
    pub secret: String,
    pub message: String,
}

/// POST /notify
///
/// 204 once every subscriber with an email has been sent `message`.
#[instrument(skip(state, req), fields(node = %req.node_public_key))]
pub async fn notify(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NotifyRequest>,
) -> Result<StatusCode, AppError> {
    state
        .notifier
        .notify(&req.node_public_key, &req.secret, &req.message)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
