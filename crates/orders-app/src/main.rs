use std::env;

use orders_store::config::StoreConfig;
use orders_store::OrderStateStore;
use orders_types::domain::order::RecordId;
use orders_types::ports::credentials::StaticToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for ORDERS_API_ENDPOINT / ORDERS_TOKEN when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = StoreConfig::from_env()?;
    let store = OrderStateStore::from_config(&config)?;
    let auth = match env::var("ORDERS_TOKEN") {
        Ok(token) => StaticToken::new(token),
        Err(_) => StaticToken::absent(),
    };

    match env::var("ORDERS_USER_ID") {
        Ok(user) => store.list_by_user(&auth, &RecordId::from(user)).await,
        Err(_) => store.list_all(&auth, store.page_query(0)).await,
    }

    let state = store.snapshot();
    if let Some(error) = state.error() {
        anyhow::bail!("{error}");
    }
    tracing::info!(
        endpoint = %config.api_endpoint,
        orders = state.orders().len(),
        page = state.collection.current_page,
        total_pages = state.collection.total_pages,
        "orders loaded"
    );
    for order in state.orders() {
        tracing::info!(id = %order.id, items = order.items.len(), "order");
    }
    Ok(())
}
