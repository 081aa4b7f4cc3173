pub mod credentials;
pub mod order_gateway;
