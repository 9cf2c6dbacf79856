use super::error::StoreError;
use super::store::{ContractStore, CredentialStore, Store};
use crate::models::{Contract, Entity, NewEntity, Node, ResolvedContact};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    nodes: Vec<Node>,
    entities: Vec<Entity>,
    contracts: Vec<Contract>,
}

/// In-memory store with the same referential rules as the Postgres schema.
///
/// `set_unavailable(true)` makes every call fail as if the database were down.
#[derive(Default)]
pub struct MockStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(anyhow::anyhow!(
                "mock store marked unavailable"
            )));
        }

        self.tables
            .lock()
            .map_err(|e| StoreError::Unavailable(anyhow::anyhow!("mock store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl CredentialStore for MockStore {
    async fn create_node(&self, name: &str, description: &str) -> Result<Node, StoreError> {
        let now = Utc::now();
        let node = Node {
            public_key: Uuid::new_v4(),
            secret: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            created: now,
            modified: now,
        };

        self.tables()?.nodes.push(node.clone());
        Ok(node)
    }

    async fn find_node(&self, public_key: Uuid) -> Result<Option<Node>, StoreError> {
        Ok(self
            .tables()?
            .nodes
            .iter()
            .find(|n| n.public_key == public_key)
            .cloned())
    }

    async fn create_entity(&self, entity: &NewEntity) -> Result<Entity, StoreError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let created = Entity {
            id: tables.entities.len() as i32 + 1,
            name: entity.name.clone(),
            email: entity.channels.email().map(str::to_string),
            sms: entity.channels.sms(),
            created: now,
            modified: now,
        };

        tables.entities.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ContractStore for MockStore {
    async fn create_contract(
        &self,
        node_public_key: Uuid,
        entity_id: i32,
    ) -> Result<Contract, StoreError> {
        let mut tables = self.tables()?;

        if !tables.nodes.iter().any(|n| n.public_key == node_public_key)
            || !tables.entities.iter().any(|e| e.id == entity_id)
        {
            return Err(StoreError::NotFound("node or entity"));
        }

        let now = Utc::now();
        let contract = Contract {
            id: tables.contracts.len() as i32 + 1,
            node_public_key,
            entity_id,
            created: now,
            modified: now,
        };

        tables.contracts.push(contract.clone());
        Ok(contract)
    }

    async fn resolve_contracts(
        &self,
        node_public_key: Uuid,
    ) -> Result<Vec<ResolvedContact>, StoreError> {
        let tables = self.tables()?;

        Ok(tables
            .contracts
            .iter()
            .filter(|c| c.node_public_key == node_public_key)
            .filter_map(|c| tables.entities.iter().find(|e| e.id == c.entity_id))
            .map(|e| ResolvedContact {
                email: e.email.clone(),
                sms: e.sms,
            })
            .collect())
    }
}

#[async_trait]
impl Store for MockStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_contacts_of_subscribed_entities() {
        let store = MockStore::new();
        let node = store.create_node("N2", "").await.unwrap();
        let other = store.create_node("N3", "").await.unwrap();

        let a = store
            .create_entity(&NewEntity::new("A", Some("a@x.com".to_string()), None).unwrap())
            .await
            .unwrap();
        let b = store
            .create_entity(&NewEntity::new("B", None, Some(555)).unwrap())
            .await
            .unwrap();

        store.create_contract(node.public_key, a.id).await.unwrap();
        store.create_contract(node.public_key, b.id).await.unwrap();
        store.create_contract(other.public_key, a.id).await.unwrap();

        let contacts = store.resolve_contracts(node.public_key).await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert!(contacts.contains(&ResolvedContact {
            email: Some("a@x.com".to_string()),
            sms: None,
        }));
        assert!(contacts.contains(&ResolvedContact {
            email: None,
            sms: Some(555),
        }));
    }

    #[tokio::test]
    async fn duplicate_contracts_resolve_twice() {
        let store = MockStore::new();
        let node = store.create_node("N", "").await.unwrap();
        let a = store
            .create_entity(&NewEntity::new("A", Some("a@x.com".to_string()), None).unwrap())
            .await
            .unwrap();

        store.create_contract(node.public_key, a.id).await.unwrap();
        store.create_contract(node.public_key, a.id).await.unwrap();

        assert_eq!(store.resolve_contracts(node.public_key).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn contract_requires_both_parents() {
        let store = MockStore::new();
        let node = store.create_node("N", "").await.unwrap();

        let err = store.create_contract(node.public_key, 42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.create_contract(Uuid::new_v4(), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MockStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.health_check().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.find_node(Uuid::new_v4()).await.is_err());
    }
}
