//! orders-stub: in-memory orders backend served over HTTP, for tests and demos

pub mod errors;
pub mod memory;
pub mod server;

pub use memory::InMemoryOrders;
pub use server::{RunningStub, StubServer, StubServerConfig};

/// Starts a stub on a free loopback port that accepts `token`.
pub async fn spawn_stub(orders: InMemoryOrders, token: &str) -> anyhow::Result<RunningStub> {
    StubServer::new(
        orders,
        StubServerConfig {
            port: "0".into(),
            token: token.into(),
        },
    )
    .spawn()
    .await
}
