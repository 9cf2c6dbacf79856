//! PostgreSQL store for lorafication.

use super::error::StoreError;
use super::metrics::record_db_query;
use super::schema::SCHEMA;
use super::store::{ContractStore, CredentialStore, Store};
use crate::config::DatabaseConfig;
use crate::models::{Contract, Entity, NewEntity, Node, ResolvedContact};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect, retrying once a second until the server accepts connections
    /// or `connect_attempts` is exhausted.
    #[instrument(skip(config), fields(host = %config.host, database = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!("connecting to postgres database");

        let mut attempt = 1;
        let pool = loop {
            let result = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .idle_timeout(Duration::from_secs(600))
                .connect_with(config.connect_options())
                .await;

            match result {
                Ok(pool) => break pool,
                Err(e) if attempt < config.connect_attempts => {
                    warn!(attempt, error = %e, "postgres not reachable yet, retrying");
                    attempt += 1;
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    return Err(AppError::DatabaseError(anyhow::anyhow!(
                        "connect after {} attempts: {}",
                        attempt,
                        e
                    )))
                }
            }
        };

        info!("connected to postgres database");

        Ok(Self { pool })
    }

    /// Create the extension and tables if they do not exist yet.
    #[instrument(skip(self))]
    pub async fn apply_schema(&self) -> Result<(), AppError> {
        info!("applying database schema");
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("apply database schema: {}", e)))?;
        info!("database schema applied");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for Database {
    #[instrument(skip(self, description))]
    async fn create_node(&self, name: &str, description: &str) -> Result<Node, StoreError> {
        let started = Instant::now();

        let node = sqlx::query_as::<_, Node>(
            r#"
            INSERT INTO node (name, description)
            VALUES ($1, $2)
            RETURNING public_key, secret, name, description, created, modified
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        record_db_query("create_node", started.elapsed());
        info!(public_key = %node.public_key, "node created");

        Ok(node)
    }

    #[instrument(skip(self))]
    async fn find_node(&self, public_key: Uuid) -> Result<Option<Node>, StoreError> {
        let started = Instant::now();

        let node = sqlx::query_as::<_, Node>(
            r#"
            SELECT public_key, secret, name, description, created, modified
            FROM node
            WHERE public_key = $1
            "#,
        )
        .bind(public_key)
        .fetch_optional(&self.pool)
        .await?;

        record_db_query("find_node", started.elapsed());

        Ok(node)
    }

    #[instrument(skip(self, entity), fields(name = %entity.name))]
    async fn create_entity(&self, entity: &NewEntity) -> Result<Entity, StoreError> {
        let started = Instant::now();

        let created = sqlx::query_as::<_, Entity>(
            r#"
            INSERT INTO entity (name, email, sms)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, sms, created, modified
            "#,
        )
        .bind(&entity.name)
        .bind(entity.channels.email())
        .bind(entity.channels.sms())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => {
                StoreError::Constraint("entity requires an email or sms contact channel".into())
            }
            other => StoreError::from(other),
        })?;

        record_db_query("create_entity", started.elapsed());
        info!(entity_id = created.id, "entity created");

        Ok(created)
    }
}

#[async_trait]
impl ContractStore for Database {
    #[instrument(skip(self))]
    async fn create_contract(
        &self,
        node_public_key: Uuid,
        entity_id: i32,
    ) -> Result<Contract, StoreError> {
        let started = Instant::now();

        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contract (node_public_key, entity_id)
            VALUES ($1, $2)
            RETURNING id, node_public_key, entity_id, created, modified
            "#,
        )
        .bind(node_public_key)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::NotFound("node or entity")
            }
            other => StoreError::from(other),
        })?;

        record_db_query("create_contract", started.elapsed());
        info!(contract_id = contract.id, "contract created");

        Ok(contract)
    }

    #[instrument(skip(self))]
    async fn resolve_contracts(
        &self,
        node_public_key: Uuid,
    ) -> Result<Vec<ResolvedContact>, StoreError> {
        let started = Instant::now();

        let contacts = sqlx::query_as::<_, ResolvedContact>(
            r#"
            SELECT entity.email, entity.sms
            FROM contract
            INNER JOIN entity ON contract.entity_id = entity.id
            WHERE contract.node_public_key = $1
            ORDER BY contract.id
            "#,
        )
        .bind(node_public_key)
        .fetch_all(&self.pool)
        .await?;

        record_db_query("resolve_contracts", started.elapsed());

        Ok(contacts)
    }
}

#[async_trait]
impl Store for Database {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT true").execute(&self.pool).await?;
        Ok(())
    }
}
