use orders_client::OrdersClient;
use orders_store::errors::{FORBIDDEN_ORDER_MESSAGE, UNAUTHORIZED_MESSAGE};
use orders_store::OrderStateStore;
use orders_stub::{spawn_stub, InMemoryOrders};
use orders_types::domain::order::RecordId;
use orders_types::domain::page::ListQuery;
use orders_types::ports::credentials::StaticToken;
use serde_json::json;

const TOKEN: &str = "flow-token";

// End-to-end store flow against the stub backend.
#[tokio::test]
async fn create_list_update_items_delete_flow() {
    let stub = spawn_stub(InMemoryOrders::new(), TOKEN).await.unwrap();
    let store = OrderStateStore::new(OrdersClient::new(&stub.base_url()).unwrap());
    let auth = StaticToken::new(TOKEN);

    store
        .create(&auth, &json!({ "customer": "Eve", "userId": "u-1" }))
        .await;
    let created = store.snapshot().orders()[0].clone();
    assert!(store.snapshot().order.is_none());

    store.list_all(&auth, ListQuery::default()).await;
    let state = store.snapshot();
    assert_eq!(
        state.orders().iter().filter(|o| o.id == created.id).count(),
        1
    );
    assert_eq!(state.collection.total_pages, 1);

    store
        .update(&auth, &created.id, &json!({ "customer": "Eve Adams" }))
        .await;
    let state = store.snapshot();
    assert_eq!(
        state.orders()[0].field("customer"),
        Some(&json!("Eve Adams"))
    );
    assert_eq!(state.order.as_ref().map(|o| &o.id), Some(&created.id));

    store
        .add_item(&auth, &created.id, &json!({ "id": "i-1", "sku": "G-3" }))
        .await;
    assert_eq!(store.snapshot().orders()[0].items.len(), 1);
    store
        .remove_item(&auth, &created.id, &RecordId::from("i-1"))
        .await;
    assert!(store.snapshot().orders()[0].items.is_empty());

    store.list_by_user(&auth, &RecordId::from("u-1")).await;
    assert_eq!(store.snapshot().orders().len(), 1);

    store.delete(&auth, &created.id).await;
    let state = store.snapshot();
    assert!(state.orders().is_empty());
    assert!(state.error().is_none());

    stub.shutdown();
}

#[tokio::test]
async fn paging_through_the_stub() {
    let orders = InMemoryOrders::new();
    for n in 0..20 {
        orders.create(json!({ "n": n })).unwrap();
    }
    let stub = spawn_stub(orders, TOKEN).await.unwrap();
    let store = OrderStateStore::new(OrdersClient::new(&stub.base_url()).unwrap());
    let auth = StaticToken::new(TOKEN);

    store.list_all(&auth, store.page_query(2)).await;
    let state = store.snapshot();
    assert_eq!(state.collection.current_page, 2);
    assert_eq!(state.collection.total_pages, 3);
    assert_eq!(state.orders().len(), 4);
    assert_eq!(state.orders()[0].field("n"), Some(&json!(16)));

    stub.shutdown();
}

#[tokio::test]
async fn backend_rejections_surface_as_messages() {
    let orders = InMemoryOrders::new();
    orders.seed(serde_json::from_value(json!({ "id": 3 })).unwrap());
    orders.forbid(RecordId::from(3));
    let stub = spawn_stub(orders, TOKEN).await.unwrap();
    let store = OrderStateStore::new(OrdersClient::new(&stub.base_url()).unwrap());

    store
        .get_by_id(&StaticToken::new(TOKEN), &RecordId::from(3))
        .await;
    assert_eq!(store.snapshot().error(), Some(FORBIDDEN_ORDER_MESSAGE));

    store
        .list_all(&StaticToken::new("stale"), ListQuery::default())
        .await;
    let error = store.snapshot().error().map(str::to_owned).unwrap();
    assert!(error.starts_with("Could not load the orders (401)"));

    store
        .list_all(&StaticToken::absent(), ListQuery::default())
        .await;
    assert_eq!(store.snapshot().error(), Some(UNAUTHORIZED_MESSAGE));

    stub.shutdown();
}
