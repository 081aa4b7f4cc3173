//! orders-store: client-side state mirror of a remote orders resource

pub mod config;
pub mod errors;
pub mod state;
pub mod store;

pub use orders_types::{domain, ports};
pub use store::OrderStateStore;
