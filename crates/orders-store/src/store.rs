use std::future::Future;

use orders_client::OrdersClient;
use orders_types::domain::order::{Order, RecordId};
use orders_types::domain::page::{ListQuery, OrderListing, DEFAULT_PAGE_SIZE};
use orders_types::ports::credentials::CredentialSource;
use orders_types::ports::order_gateway::{GatewayError, OrderGateway};
use serde_json::Value;
use tokio::sync::{watch, Mutex};

use crate::config::StoreConfig;
use crate::errors::{Operation, StoreError};
use crate::state::OrderState;

/// Client-side mirror of the orders resource.
///
/// Operations never return results; they update the shared [`OrderState`],
/// which callers read with [`snapshot`](Self::snapshot) or follow with
/// [`subscribe`](Self::subscribe). Overlapping calls are queued and run in
/// the order they were made.
pub struct OrderStateStore<G: OrderGateway> {
    gateway: G,
    state: watch::Sender<OrderState>,
    gate: Mutex<()>,
    page_size: u32,
}

impl OrderStateStore<OrdersClient> {
    pub fn from_config(config: &StoreConfig) -> anyhow::Result<Self> {
        let mut builder = OrdersClient::builder(config.api_endpoint.as_str())?;
        if let Some(timeout) = config.timeout {
            builder = builder.with_timeout(timeout);
        }
        Ok(Self::with_page_size(builder.build()?, config.page_size))
    }
}

impl<G: OrderGateway> OrderStateStore<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_page_size(gateway, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(gateway: G, page_size: u32) -> Self {
        let (state, _) = watch::channel(OrderState::new(page_size));
        Self {
            gateway,
            state,
            gate: Mutex::new(()),
            page_size,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn snapshot(&self) -> OrderState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrderState> {
        self.state.subscribe()
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.status.error.take().is_some());
    }

    /// Query for `page` using the configured page size.
    pub fn page_query(&self, page: u32) -> ListQuery {
        ListQuery::page(page, self.page_size)
    }

    pub async fn list_all(&self, auth: &dyn CredentialSource, query: ListQuery) {
        self.run(
            Operation::ListAll,
            auth,
            |token| async move { self.gateway.list(&token, &query).await },
            apply_listing,
        )
        .await
    }

    pub async fn list_by_user(&self, auth: &dyn CredentialSource, user_id: &RecordId) {
        self.run(
            Operation::ListByUser,
            auth,
            |token| async move { self.gateway.list_by_user(&token, user_id).await },
            apply_listing,
        )
        .await
    }

    pub async fn get_by_id(&self, auth: &dyn CredentialSource, id: &RecordId) {
        self.run(
            Operation::GetById,
            auth,
            |token| async move { self.gateway.get(&token, id).await },
            |s, order| s.order = Some(order),
        )
        .await
    }

    pub async fn create(&self, auth: &dyn CredentialSource, data: &Value) {
        self.run(
            Operation::Create,
            auth,
            |token| async move { self.gateway.create(&token, data).await },
            |s, order| s.collection.append(order),
        )
        .await
    }

    pub async fn update(&self, auth: &dyn CredentialSource, id: &RecordId, data: &Value) {
        self.run(
            Operation::Update,
            auth,
            |token| async move { self.gateway.update(&token, id, data).await },
            |s, order: Order| {
                s.collection.replace(id, order.clone());
                s.order = Some(order);
            },
        )
        .await
    }

    pub async fn delete(&self, auth: &dyn CredentialSource, id: &RecordId) {
        self.run(
            Operation::Delete,
            auth,
            |token| async move { self.gateway.delete(&token, id).await },
            |s, ()| {
                s.collection.remove(id);
            },
        )
        .await
    }

    /// Appends the created item to the loaded order. Nothing changes locally
    /// when `order_id` is not on the current page.
    pub async fn add_item(&self, auth: &dyn CredentialSource, order_id: &RecordId, data: &Value) {
        self.run(
            Operation::AddItem,
            auth,
            |token| async move { self.gateway.add_item(&token, order_id, data).await },
            |s, item| {
                if !s.collection.push_item(order_id, item) {
                    tracing::debug!(%order_id, "item added to an order that is not loaded");
                }
            },
        )
        .await
    }

    /// Same no-op rule as [`add_item`](Self::add_item).
    pub async fn remove_item(
        &self,
        auth: &dyn CredentialSource,
        order_id: &RecordId,
        item_id: &RecordId,
    ) {
        self.run(
            Operation::RemoveItem,
            auth,
            |token| async move { self.gateway.remove_item(&token, order_id, item_id).await },
            |s, ()| {
                if s.collection.find_mut(order_id).is_none() {
                    tracing::debug!(%order_id, "item removed from an order that is not loaded");
                    return;
                }
                s.collection.remove_item(order_id, item_id);
            },
        )
        .await
    }

    async fn run<T, F, Fut, A>(&self, op: Operation, auth: &dyn CredentialSource, call: F, apply: A)
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
        A: FnOnce(&mut OrderState, T),
    {
        let _turn = self.gate.lock().await;
        let loading = Loading::start(&self.state, op);

        let result = match auth.bearer_token() {
            Some(token) => call(token).await.map_err(StoreError::from),
            None => Err(StoreError::Unauthorized),
        };

        match result {
            Ok(value) => loading.finish(|s| apply(s, value)),
            Err(err) => {
                let message = err.message_for(op);
                tracing::warn!(op = op.name(), error = %err, %message, "orders request failed");
                loading.finish(|s| s.status.error = Some(message));
            }
        }
    }
}

/// Holds `is_loading` up for one operation. Dropping it unfinished (the
/// caller gave up on the future) lowers the flag and leaves `error` alone.
struct Loading<'a> {
    state: &'a watch::Sender<OrderState>,
    op: Operation,
    finished: bool,
}

impl<'a> Loading<'a> {
    fn start(state: &'a watch::Sender<OrderState>, op: Operation) -> Self {
        state.send_modify(|s| {
            s.status.is_loading = true;
            s.status.error = None;
        });
        tracing::debug!(op = op.name(), "orders request started");
        Self {
            state,
            op,
            finished: false,
        }
    }

    fn finish(mut self, publish: impl FnOnce(&mut OrderState)) {
        self.finished = true;
        self.state.send_modify(|s| {
            publish(s);
            s.status.is_loading = false;
        });
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::debug!(op = self.op.name(), "orders request cancelled");
        self.state.send_modify(|s| s.status.is_loading = false);
    }
}

fn apply_listing(state: &mut OrderState, listing: OrderListing) {
    let (orders, info) = listing.into_parts();
    state.collection.replace_page(orders, info);
}
