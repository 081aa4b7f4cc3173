///  To run :
///  cargo r --example store_demo
use orders_store::OrderStateStore;
use orders_stub::{spawn_stub, InMemoryOrders};
use orders_types::domain::order::RecordId;
use orders_types::domain::page::SortDirection;
use orders_types::ports::credentials::SessionStorage;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    // Stub backend on an ephemeral port with a few orders already in it.
    let orders = InMemoryOrders::new();
    for (customer, total) in [("Ana", 1200), ("Bea", 300), ("Cai", 4500)] {
        orders.create(json!({ "customer": customer, "total": total, "userId": "u-1" }))?;
    }
    orders.seed(serde_json::from_value(json!({ "id": 99, "customer": "Locked" }))?);
    orders.forbid(RecordId::from(99));
    let stub = spawn_stub(orders, "demo-token").await?;

    let store = OrderStateStore::from_config(&orders_store::config::StoreConfig::new(
        &stub.base_url(),
    )?)?;

    let mut rx = store.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let s = rx.borrow_and_update().clone();
            println!(
                "  [state] loading={} orders={} error={:?}",
                s.is_loading(),
                s.orders().len(),
                s.error()
            );
        }
    });

    let session = SessionStorage::new();

    println!("listing while signed out");
    store.list_all(&session, store.page_query(0)).await;

    session.sign_in("demo-token");
    println!("listing sorted by total, descending");
    store
        .list_all(
            &session,
            store.page_query(0).sorted_by("total", SortDirection::Desc),
        )
        .await;

    let first = store.snapshot().orders()[0].id.clone();
    println!("adding an item to {first}");
    store
        .add_item(&session, &first, &json!({ "sku": "W-1", "qty": 1 }))
        .await;

    println!("updating {first}");
    store
        .update(&session, &first, &json!({ "customer": "Ana Maria" }))
        .await;

    println!("fetching a locked order");
    store.get_by_id(&session, &RecordId::from(99)).await;

    println!("deleting {first}");
    store.delete(&session, &first).await;

    let state = store.snapshot();
    println!(
        "final: {} orders on page {}/{}, selected={:?}",
        state.orders().len(),
        state.collection.current_page + 1,
        state.collection.total_pages,
        state.order.as_ref().map(|o| o.id.to_string())
    );

    drop(store);
    watcher.await?;
    stub.shutdown();
    Ok(())
}
