use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use service_core::web::ApiResponse;

use crate::services::Store;
use crate::AppState;

async fn probe(state: &AppState) -> StatusCode {
    match state.store.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "store health check failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET /ready
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    probe(&state).await
}

/// GET /healthy
pub async fn healthy(State(state): State<AppState>) -> StatusCode {
    probe(&state).await
}

/// Any route not in the table.
pub async fn fallback(uri: Uri) -> impl IntoResponse {
    tracing::warn!(request_uri = %uri, "route not found");
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Not Found")),
    )
}
