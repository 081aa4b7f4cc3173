//! orders-types: records, list shapes and ports shared by the orders store crates

pub mod domain;
pub mod ports;
