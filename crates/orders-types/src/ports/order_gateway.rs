use async_trait::async_trait;
use serde_json::Value;

use crate::domain::order::{Order, OrderItem, RecordId};
use crate::domain::page::{ListQuery, OrderListing};

pub const FORBIDDEN: u16 = 403;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The server answered with a non-2xx status.
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    /// The request went out but no response came back.
    #[error("no response received: {0}")]
    Network(String),

    /// The request could not be built or sent, or the body was unreadable.
    #[error("request failed: {0}")]
    Request(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(FORBIDDEN)
    }
}

/// Remote orders resource. Every call carries the caller's bearer token.
#[async_trait]
pub trait OrderGateway: Send + Sync + 'static {
    async fn list(&self, token: &str, query: &ListQuery) -> Result<OrderListing, GatewayError>;
    async fn list_by_user(
        &self,
        token: &str,
        user_id: &RecordId,
    ) -> Result<OrderListing, GatewayError>;
    async fn get(&self, token: &str, id: &RecordId) -> Result<Order, GatewayError>;
    async fn create(&self, token: &str, data: &Value) -> Result<Order, GatewayError>;
    async fn update(&self, token: &str, id: &RecordId, data: &Value)
        -> Result<Order, GatewayError>;
    async fn delete(&self, token: &str, id: &RecordId) -> Result<(), GatewayError>;
    async fn add_item(
        &self,
        token: &str,
        order_id: &RecordId,
        data: &Value,
    ) -> Result<OrderItem, GatewayError>;
    async fn remove_item(
        &self,
        token: &str,
        order_id: &RecordId,
        item_id: &RecordId,
    ) -> Result<(), GatewayError>;
}
