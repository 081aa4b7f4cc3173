use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use orders_types::domain::order::{Order, OrderItem, RecordId};
use orders_types::domain::page::{ListQuery, OrderListing};
use orders_types::ports::order_gateway::{GatewayError, OrderGateway};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone)]
pub struct OrdersClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

/// HTTP adapter for the orders API.
#[derive(Clone)]
pub struct OrdersClient {
    base: Url,
    client: reqwest::Client,
}

impl OrdersClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<OrdersClientBuilder> {
        let mut base = Url::parse(base_url).context("invalid base url")?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base url cannot carry a path: {base_url}");
        }
        // keep the base path when joining segments
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(OrdersClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Request(format!("cannot extend {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, GatewayError> {
        let res = req.send().await.map_err(transport_error)?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let message = server_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });
        tracing::debug!(status = status.as_u16(), %message, "orders api rejected request");
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, GatewayError> {
        let res = self.send(req).await?;
        res.json()
            .await
            .map_err(|e| GatewayError::Request(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl OrderGateway for OrdersClient {
    async fn list(&self, token: &str, query: &ListQuery) -> Result<OrderListing, GatewayError> {
        let req = self
            .request(Method::GET, self.url(&["orders"])?, token)
            .query(&query.to_params());
        self.send_json(req).await
    }

    async fn list_by_user(
        &self,
        token: &str,
        user_id: &RecordId,
    ) -> Result<OrderListing, GatewayError> {
        let user = user_id.to_string();
        let req = self.request(Method::GET, self.url(&["orders", "user", &user])?, token);
        self.send_json(req).await
    }

    async fn get(&self, token: &str, id: &RecordId) -> Result<Order, GatewayError> {
        let id = id.to_string();
        let req = self.request(Method::GET, self.url(&["orders", &id])?, token);
        self.send_json(req).await
    }

    async fn create(&self, token: &str, data: &Value) -> Result<Order, GatewayError> {
        let req = self
            .request(Method::POST, self.url(&["orders"])?, token)
            .json(data);
        self.send_json(req).await
    }

    async fn update(
        &self,
        token: &str,
        id: &RecordId,
        data: &Value,
    ) -> Result<Order, GatewayError> {
        let id = id.to_string();
        let req = self
            .request(Method::PUT, self.url(&["orders", &id])?, token)
            .json(data);
        self.send_json(req).await
    }

    async fn delete(&self, token: &str, id: &RecordId) -> Result<(), GatewayError> {
        let id = id.to_string();
        let req = self.request(Method::DELETE, self.url(&["orders", &id])?, token);
        self.send(req).await?;
        Ok(())
    }

    async fn add_item(
        &self,
        token: &str,
        order_id: &RecordId,
        data: &Value,
    ) -> Result<OrderItem, GatewayError> {
        let order_id = order_id.to_string();
        let req = self
            .request(Method::POST, self.url(&["orders", &order_id, "items"])?, token)
            .json(data);
        self.send_json(req).await
    }

    async fn remove_item(
        &self,
        token: &str,
        order_id: &RecordId,
        item_id: &RecordId,
    ) -> Result<(), GatewayError> {
        let order_id = order_id.to_string();
        let item_id = item_id.to_string();
        let req = self.request(
            Method::DELETE,
            self.url(&["orders", &order_id, "items", &item_id])?,
            token,
        );
        self.send(req).await?;
        Ok(())
    }
}

impl OrdersClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn build(self) -> anyhow::Result<OrdersClient> {
        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(OrdersClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        GatewayError::Request(err.to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}
