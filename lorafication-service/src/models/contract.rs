use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription of one entity to one node. The same pair may appear more
/// than once, and each row yields its own send.
#[derive(Debug, Clone, FromRow)]
pub struct Contract {
    pub id: i32,
    pub node_public_key: Uuid,
    pub entity_id: i32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Contact fields of the entity behind a contract, as needed for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ResolvedContact {
    pub email: Option<String>,
    pub sms: Option<i64>,
}
