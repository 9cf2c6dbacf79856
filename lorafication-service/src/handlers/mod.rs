//! HTTP handlers for lorafication-service.

pub mod contract;
pub mod entity;
pub mod health;
pub mod metrics;
pub mod node;
pub mod notify;

pub use contract::create_contract;
pub use entity::create_entity;
pub use health::{fallback, healthy, ready};
pub use self::metrics::metrics;
pub use node::create_node;
pub use notify::notify;
