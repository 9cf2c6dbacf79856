use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::web::{created, JsonBody};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::models::Node;
use crate::services::CredentialStore;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNodeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The only response that ever carries the node secret.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    pub name: String,
    pub description: String,
    pub public_key: Uuid,
    pub secret: Uuid,
}

impl From<Node> for NodeResponse {
    fn from(node: Node) -> Self {
        Self {
            name: node.name,
            description: node.description,
            public_key: node.public_key,
            secret: node.secret,
        }
    }
}

/// POST /node
#[instrument(skip(state, req), fields(name = %req.name))]
pub async fn create_node(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateNodeRequest>,
) -> Result<Response, AppError> {
    req.validate()?;

    let node = state.store.create_node(&req.name, &req.description).await?;

    Ok(created(NodeResponse::from(node)))
}
