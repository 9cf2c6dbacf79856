pub mod database;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod mock_store;
pub mod notifier;
pub mod providers;
pub mod resolver;
pub mod schema;
pub mod store;

pub use database::Database;
pub use dispatcher::Dispatcher;
pub use error::{NotifyError, StoreError};
pub use self::metrics::{get_metrics, init_metrics, record_db_query, record_email, record_notification};
pub use mock_store::MockStore;
pub use notifier::{notification_subject, NotifyReport, Notifier};
pub use providers::{
    EmailMessage, EmailProvider, MockEmailProvider, ProviderError, ProviderResponse, SmtpProvider,
};
pub use resolver::{Resolution, Resolver};
pub use store::{ContractStore, CredentialStore, Store};
