use orders_types::ports::order_gateway::GatewayError;
use thiserror::Error;

/// Store operation, used to phrase failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListAll,
    ListByUser,
    GetById,
    Create,
    Update,
    Delete,
    AddItem,
    RemoveItem,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::ListAll => "list_all",
            Operation::ListByUser => "list_by_user",
            Operation::GetById => "get_by_id",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::AddItem => "add_item",
            Operation::RemoveItem => "remove_item",
        }
    }

    fn failure_text(self) -> &'static str {
        match self {
            Operation::ListAll | Operation::ListByUser => "Could not load the orders",
            Operation::GetById => "Could not load the order",
            Operation::Create => "Could not create the order",
            Operation::Update => "Could not update the order",
            Operation::Delete => "Could not delete the order",
            Operation::AddItem => "Could not add the item",
            Operation::RemoveItem => "Could not remove the item",
        }
    }
}

pub const UNAUTHORIZED_MESSAGE: &str = "You are not signed in.";
pub const FORBIDDEN_LIST_MESSAGE: &str = "You do not have permission to view the orders.";
pub const FORBIDDEN_ORDER_MESSAGE: &str = "You do not have permission to view this order.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unauthorized: no session token")]
    Unauthorized,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl StoreError {
    /// Text shown to the user when `op` fails with this error.
    pub fn message_for(&self, op: Operation) -> String {
        let gateway = match self {
            StoreError::Unauthorized => return UNAUTHORIZED_MESSAGE.to_string(),
            StoreError::Gateway(e) => e,
        };

        if gateway.is_forbidden() {
            match op {
                Operation::ListAll | Operation::ListByUser => {
                    return FORBIDDEN_LIST_MESSAGE.to_string()
                }
                Operation::GetById => return FORBIDDEN_ORDER_MESSAGE.to_string(),
                _ => {}
            }
        }

        let what = op.failure_text();
        match gateway {
            GatewayError::Status { status, message } => format!("{what} ({status}): {message}"),
            GatewayError::Network(_) => {
                format!("{what}: no response from the server, check your connection.")
            }
            GatewayError::Request(desc) => format!("{what}: {desc}"),
        }
    }
}
