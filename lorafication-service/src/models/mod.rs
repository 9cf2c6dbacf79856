pub mod contract;
pub mod entity;
pub mod node;

pub use contract::{Contract, ResolvedContact};
pub use entity::{ContactChannels, Entity, EntityError, NewEntity};
pub use node::Node;
