use super::dispatcher::Dispatcher;
use super::error::NotifyError;
use super::metrics::record_notification;
use super::resolver::Resolver;
use tracing::{info, instrument, warn};

/// Subject line of every notification email.
pub fn notification_subject(node_name: &str) -> String {
    format!("LoRafication: Notification from {} Node", node_name)
}

/// What a successful notify did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyReport {
    /// Contracts resolved for the node.
    pub contacts: usize,
    /// Emails handed to the provider.
    pub sent: usize,
}

/// Authenticates a node, resolves its subscribers and sends them `message`.
#[derive(Clone)]
pub struct Notifier {
    resolver: Resolver,
    dispatcher: Dispatcher,
}

impl Notifier {
    pub fn new(resolver: Resolver, dispatcher: Dispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    #[instrument(skip(self, secret, message))]
    pub async fn notify(
        &self,
        public_key: &str,
        secret: &str,
        message: &str,
    ) -> Result<NotifyReport, NotifyError> {
        let result = self.run(public_key, secret, message).await;

        match &result {
            Ok(report) => {
                record_notification("sent");
                info!(contacts = report.contacts, sent = report.sent, "notification dispatched");
            }
            Err(e) => {
                record_notification(e.kind());
                warn!(error = %e, kind = e.kind(), "notification failed");
            }
        }

        result
    }

    async fn run(
        &self,
        public_key: &str,
        secret: &str,
        message: &str,
    ) -> Result<NotifyReport, NotifyError> {
        let resolution = self.resolver.resolve(public_key, secret).await?;
        let subject = notification_subject(&resolution.node.name);

        let sent = self
            .dispatcher
            .dispatch(&resolution.contacts, &subject, message)
            .await?;

        Ok(NotifyReport {
            contacts: resolution.contacts.len(),
            sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEntity, Node};
    use crate::services::{ContractStore, CredentialStore, MockEmailProvider, MockStore};
    use std::sync::Arc;

    fn notifier(store: Arc<MockStore>, mock: Arc<MockEmailProvider>) -> Notifier {
        Notifier::new(Resolver::new(store), Dispatcher::new(mock))
    }

    async fn subscribe(store: &MockStore, node: &Node, email: Option<&str>, sms: Option<i64>) {
        let entity = store
            .create_entity(&NewEntity::new("E", email.map(str::to_string), sms).unwrap())
            .await
            .unwrap();
        store.create_contract(node.public_key, entity.id).await.unwrap();
    }

    #[test]
    fn subject_names_the_node() {
        assert_eq!(
            notification_subject("N2"),
            "LoRafication: Notification from N2 Node"
        );
    }

    #[tokio::test]
    async fn email_and_sms_subscribers() {
        let store = Arc::new(MockStore::new());
        let mock = Arc::new(MockEmailProvider::new(true));
        let node = store.create_node("N2", "").await.unwrap();
        subscribe(&store, &node, Some("a@x.com"), None).await;
        subscribe(&store, &node, None, Some(555)).await;

        let report = notifier(store, mock.clone())
            .notify(&node.public_key.to_string(), &node.secret.to_string(), "hi")
            .await
            .unwrap();

        assert_eq!(report, NotifyReport { contacts: 2, sent: 1 });
        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, "LoRafication: Notification from N2 Node");
        assert_eq!(sent[0].body, "hi");
    }

    #[tokio::test]
    async fn duplicate_contracts_send_twice() {
        let store = Arc::new(MockStore::new());
        let mock = Arc::new(MockEmailProvider::new(true));
        let node = store.create_node("N1", "").await.unwrap();
        let entity = store
            .create_entity(&NewEntity::new("A", Some("a@x.com".to_string()), None).unwrap())
            .await
            .unwrap();
        store.create_contract(node.public_key, entity.id).await.unwrap();
        store.create_contract(node.public_key, entity.id).await.unwrap();

        let report = notifier(store, mock.clone())
            .notify(&node.public_key.to_string(), &node.secret.to_string(), "hi")
            .await
            .unwrap();

        assert_eq!(report.sent, 2);
        assert_eq!(mock.attempted(), vec!["a@x.com", "a@x.com"]);
    }

    #[tokio::test]
    async fn wrong_secret_sends_nothing() {
        let store = Arc::new(MockStore::new());
        let mock = Arc::new(MockEmailProvider::new(true));
        let node = store.create_node("N1", "").await.unwrap();
        subscribe(&store, &node, Some("a@x.com"), None).await;

        let err = notifier(store, mock.clone())
            .notify(&node.public_key.to_string(), "wrong", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::AuthenticationFailure));
        assert!(mock.attempted().is_empty());
    }

    #[tokio::test]
    async fn send_failure_is_reported_with_recipient() {
        let store = Arc::new(MockStore::new());
        let mock = Arc::new(MockEmailProvider::new(true).fail_for("b@x.com"));
        let node = store.create_node("N1", "").await.unwrap();
        subscribe(&store, &node, Some("a@x.com"), None).await;
        subscribe(&store, &node, Some("b@x.com"), None).await;
        subscribe(&store, &node, Some("c@x.com"), None).await;

        let err = notifier(store, mock.clone())
            .notify(&node.public_key.to_string(), &node.secret.to_string(), "hi")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "send_failed");
        assert!(err.to_string().contains("b@x.com"));
        assert_eq!(mock.attempted(), vec!["a@x.com", "b@x.com"]);
    }
}
