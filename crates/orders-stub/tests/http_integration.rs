use orders_stub::{spawn_stub, InMemoryOrders};
use orders_types::domain::order::{Order, RecordId};
use orders_types::domain::page::PageEnvelope;
use serde_json::json;

const TOKEN: &str = "stub-token";

#[tokio::test]
async fn crud_over_http() {
    let stub = spawn_stub(InMemoryOrders::new(), TOKEN).await.unwrap();
    let addr = stub.base_url();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{addr}/orders"))
        .bearer_auth(TOKEN)
        .json(&json!({ "customer": "HttpUser" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: Order = res.json().await.unwrap();
    let id = created.id.to_string();

    let page: PageEnvelope<Order> = client
        .get(format!("{addr}/orders?page=0&size=8&sort=customer,asc"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total_pages, Some(1));

    let res = client
        .put(format!("{addr}/orders/{id}"))
        .bearer_auth(TOKEN)
        .json(&json!({ "customer": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated: Order = res.json().await.unwrap();
    assert_eq!(updated.field("customer"), Some(&json!("Renamed")));

    let res = client
        .delete(format!("{addr}/orders/{id}"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    stub.shutdown();
}

#[tokio::test]
async fn auth_forbidden_and_not_found_paths() {
    let orders = InMemoryOrders::new();
    orders.seed(serde_json::from_value(json!({ "id": 1, "secret": true })).unwrap());
    orders.forbid(RecordId::from(1));
    let stub = spawn_stub(orders, TOKEN).await.unwrap();
    let addr = stub.base_url();
    let client = reqwest::Client::new();

    let res = client.get(format!("{addr}/orders")).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{addr}/orders/1"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("forbidden"));

    let res = client
        .get(format!("{addr}/orders/missing"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{addr}/orders?sort=total,sideways"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    stub.shutdown();
}

#[tokio::test]
async fn forbidden_number_without_row_is_403() {
    let orders = InMemoryOrders::new();
    orders.forbid(RecordId::from(5));
    let stub = spawn_stub(orders, TOKEN).await.unwrap();
    let addr = stub.base_url();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{addr}/orders/5"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{addr}/orders/5"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    stub.shutdown();
}
