use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get},
    serve, Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::errors::StubError;
use crate::memory::{InMemoryOrders, PageRequest};
use orders_types::domain::order::{Order, OrderItem, RecordId};
use orders_types::domain::page::{PageEnvelope, SortDirection};

#[derive(Clone)]
pub struct StubServerConfig {
    /// `"0"` picks a free port.
    pub port: String,
    pub token: String,
}

#[derive(Clone)]
struct StubState {
    orders: InMemoryOrders,
    token: String,
}

#[derive(Clone)]
pub struct StubServer {
    pub orders: InMemoryOrders,
    pub config: StubServerConfig,
}

/// A stub bound to a local port and serving in the background.
pub struct RunningStub {
    pub addr: SocketAddr,
    pub orders: InMemoryOrders,
    handle: JoinHandle<()>,
}

impl RunningStub {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

#[derive(Deserialize)]
struct ListParams {
    page: Option<u32>,
    size: Option<u32>,
    sort: Option<String>,
}

impl ListParams {
    fn into_request(self) -> Result<PageRequest, StubError> {
        let sort = match self.sort {
            Some(raw) => {
                let (field, dir) = raw.split_once(',').unwrap_or((raw.as_str(), "asc"));
                let dir: SortDirection = dir.parse().map_err(StubError::BadRequest)?;
                Some((field.to_string(), dir))
            }
            None => None,
        };
        Ok(PageRequest {
            page: self.page.unwrap_or(0),
            size: self.size.unwrap_or(0),
            sort,
        })
    }
}

impl StubServer {
    pub fn new(orders: InMemoryOrders, config: StubServerConfig) -> Self {
        Self { orders, config }
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "stub_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::debug!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let state = StubState {
            orders: self.orders.clone(),
            token: self.config.token.clone(),
        };
        Router::new()
            .route("/orders", get(list_orders).post(create_order))
            .route("/orders/user/{user_id}", get(list_user_orders))
            .route(
                "/orders/{id}",
                get(get_order).put(update_order).delete(delete_order),
            )
            .route("/orders/{id}/items", axum::routing::post(add_item))
            .route("/orders/{id}/items/{item_id}", delete(remove_item))
            .layer(trace_layer)
            .with_state(state)
    }

    /// Binds on loopback and serves from a background task.
    pub async fn spawn(self) -> anyhow::Result<RunningStub> {
        let addr: SocketAddr = format!("127.0.0.1:{}", self.config.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let handle = tokio::spawn(async move {
            if let Err(e) = serve(listener, app.into_make_service()).await {
                tracing::error!(error = %e, "orders stub stopped");
            }
        });
        tracing::info!("orders stub listening on {}", addr);
        Ok(RunningStub {
            addr,
            orders: self.orders,
            handle,
        })
    }
}

fn authorize(state: &StubState, headers: &HeaderMap) -> Result<(), StubError> {
    let expected = format!("Bearer {}", state.token);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(v) if v == expected => Ok(()),
        _ => Err(StubError::Unauthorized),
    }
}

fn guard(state: &StubState, id: &RecordId) -> Result<(), StubError> {
    if state.orders.is_forbidden(id) {
        return Err(StubError::Forbidden(format!("order {id}")));
    }
    Ok(())
}

fn item_key(raw: &str) -> RecordId {
    raw.parse::<i64>()
        .map(RecordId::Number)
        .unwrap_or_else(|_| RecordId::Text(raw.to_string()))
}

async fn list_orders(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<PageEnvelope<Order>>, StubError> {
    authorize(&state, &headers)?;
    let req = params.into_request()?;
    Ok(Json(state.orders.list(&req)))
}

async fn list_user_orders(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, StubError> {
    authorize(&state, &headers)?;
    Ok(Json(state.orders.list_by_user(&user_id)))
}

async fn create_order(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Order>), StubError> {
    authorize(&state, &headers)?;
    let order = state.orders.create(payload)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, StubError> {
    authorize(&state, &headers)?;
    let id = state.orders.resolve_id(&id);
    guard(&state, &id)?;
    state
        .orders
        .get(&id)
        .map(Json)
        .ok_or_else(|| StubError::NotFound(format!("order {id}")))
}

async fn update_order(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Order>, StubError> {
    authorize(&state, &headers)?;
    let id = state.orders.resolve_id(&id);
    guard(&state, &id)?;
    state
        .orders
        .update(&id, payload)?
        .map(Json)
        .ok_or_else(|| StubError::NotFound(format!("order {id}")))
}

async fn delete_order(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StubError> {
    authorize(&state, &headers)?;
    let id = state.orders.resolve_id(&id);
    guard(&state, &id)?;
    if state.orders.delete(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StubError::NotFound(format!("order {id}")))
    }
}

async fn add_item(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<OrderItem>), StubError> {
    authorize(&state, &headers)?;
    let id = state.orders.resolve_id(&id);
    guard(&state, &id)?;
    match state.orders.add_item(&id, payload)? {
        Some(item) => Ok((StatusCode::CREATED, Json(item))),
        None => Err(StubError::NotFound(format!("order {id}"))),
    }
}

async fn remove_item(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<StatusCode, StubError> {
    authorize(&state, &headers)?;
    let id = state.orders.resolve_id(&id);
    guard(&state, &id)?;
    match state.orders.remove_item(&id, &item_key(&item_id)) {
        Some(true) => Ok(StatusCode::NO_CONTENT),
        Some(false) => Err(StubError::NotFound(format!("item {item_id}"))),
        None => Err(StubError::NotFound(format!("order {id}"))),
    }
}
