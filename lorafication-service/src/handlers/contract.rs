use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::web::{created, JsonBody};
use tracing::instrument;
use uuid::Uuid;

use crate::models::Contract;
use crate::services::ContractStore;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    #[serde(rename = "nodePublicKey")]
    pub node_public_key: String,
    #[serde(rename = "entityID")]
    pub entity_id: i32,
}

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub id: i32,
    #[serde(rename = "nodePublicKey")]
    pub node_public_key: Uuid,
    #[serde(rename = "entityID")]
    pub entity_id: i32,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id,
            node_public_key: contract.node_public_key,
            entity_id: contract.entity_id,
        }
    }
}

/// POST /contract
#[instrument(skip(state, req), fields(entity_id = req.entity_id))]
pub async fn create_contract(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateContractRequest>,
) -> Result<Response, AppError> {
    // A key that cannot be a UUID cannot name a node.
    let node_public_key = Uuid::parse_str(req.node_public_key.trim())
        .map_err(|_| AppError::NotFound(anyhow::anyhow!("node not found")))?;

    let contract = state
        .store
        .create_contract(node_public_key, req.entity_id)
        .await?;

    Ok(created(ContractResponse::from(contract)))
}
