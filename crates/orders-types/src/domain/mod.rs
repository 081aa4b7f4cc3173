pub mod order;
pub mod page;
