use super::error::NotifyError;
use super::store::Store;
use crate::models::{Node, ResolvedContact};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// An authenticated node and the contacts subscribed to it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub node: Node,
    pub contacts: Vec<ResolvedContact>,
}

/// Turns `(public key, secret)` into the node's subscriber contact list.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn Store>,
}

impl Resolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// An unknown or malformed public key is `NotFound`; a known node with a
    /// different secret is `AuthenticationFailure`. Store failures pass
    /// through untouched. Zero contacts is a valid resolution.
    #[instrument(skip(self, secret))]
    pub async fn resolve(&self, public_key: &str, secret: &str) -> Result<Resolution, NotifyError> {
        let public_key = Uuid::parse_str(public_key.trim()).map_err(|_| NotifyError::NotFound)?;

        let node = self
            .store
            .find_node(public_key)
            .await?
            .ok_or(NotifyError::NotFound)?;

        if !node.secret_matches(secret) {
            return Err(NotifyError::AuthenticationFailure);
        }

        let contacts = self.store.resolve_contracts(node.public_key).await?;
        debug!(contacts = contacts.len(), "contracts resolved");

        Ok(Resolution { node, contacts })
    }
}
