use chrono::{DateTime, Utc};
use sqlx::FromRow;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// A registered sender of notifications.
///
/// `public_key` and `secret` are both generated by the store on insert.
#[derive(Debug, Clone, FromRow)]
pub struct Node {
    pub public_key: Uuid,
    pub secret: Uuid,
    pub name: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Node {
    /// Constant-time comparison of a caller-supplied secret.
    ///
    /// Anything that does not parse as a UUID can never match.
    pub fn secret_matches(&self, candidate: &str) -> bool {
        match Uuid::parse_str(candidate.trim()) {
            Ok(candidate) => self.secret.as_bytes().ct_eq(candidate.as_bytes()).into(),
            Err(_) => false,
        }
    }
}
