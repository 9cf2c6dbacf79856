//! Persistence seams for nodes, entities and contracts.
//!
//! [`Database`](super::Database) is the Postgres implementation;
//! [`MockStore`](super::MockStore) keeps everything in memory for tests.

use super::error::StoreError;
use crate::models::{Contract, Entity, NewEntity, Node, ResolvedContact};
use async_trait::async_trait;
use uuid::Uuid;

/// Node and entity identities.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a node; the store generates its public key and secret.
    async fn create_node(&self, name: &str, description: &str) -> Result<Node, StoreError>;

    async fn find_node(&self, public_key: Uuid) -> Result<Option<Node>, StoreError>;

    async fn create_entity(&self, entity: &NewEntity) -> Result<Entity, StoreError>;
}

/// Node to entity subscriptions.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Fails with [`StoreError::NotFound`] when the node or entity is unknown.
    async fn create_contract(
        &self,
        node_public_key: Uuid,
        entity_id: i32,
    ) -> Result<Contract, StoreError>;

    /// Contact fields for every contract of the node, one per contract row.
    async fn resolve_contracts(
        &self,
        node_public_key: Uuid,
    ) -> Result<Vec<ResolvedContact>, StoreError>;
}

#[async_trait]
pub trait Store: CredentialStore + ContractStore {
    async fn health_check(&self) -> Result<(), StoreError>;
}
