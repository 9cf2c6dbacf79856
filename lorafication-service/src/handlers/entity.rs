use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::web::{created, JsonBody};
use tracing::instrument;
use validator::Validate;

use crate::models::{Entity, NewEntity};
use crate::services::CredentialStore;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntityRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub sms: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EntityResponse {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub sms: Option<i64>,
}

impl From<Entity> for EntityResponse {
    fn from(entity: Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            sms: entity.sms,
        }
    }
}

/// POST /entity
///
/// An entity with neither email nor sms is rejected with 400 before the
/// store is touched.
#[instrument(skip(state, req), fields(name = %req.name))]
pub async fn create_entity(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateEntityRequest>,
) -> Result<Response, AppError> {
    req.validate()?;

    let entity = NewEntity::new(req.name, req.email, req.sms)?;
    let entity = state.store.create_entity(&entity).await?;

    Ok(created(EntityResponse::from(entity)))
}
