use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use dashmap::{DashMap, DashSet};
use orders_types::domain::order::{Order, OrderItem, RecordId};
use orders_types::domain::page::{PageEnvelope, SortDirection, DEFAULT_PAGE_SIZE};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::StubError;

const RESERVED: [&str; 3] = ["id", "items", "createdAt"];

#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<(String, SortDirection)>,
}

/// Orders kept in memory, listed in insertion order unless sorted.
#[derive(Clone, Default)]
pub struct InMemoryOrders {
    map: Arc<DashMap<RecordId, (u64, Order)>>,
    forbidden: Arc<DashSet<RecordId>>,
    seq: Arc<AtomicU64>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a path segment onto a stored id; numeric ids are matched when
    /// an order was seeded or forbidden with one.
    pub fn resolve_id(&self, raw: &str) -> RecordId {
        if let Ok(n) = raw.parse::<i64>() {
            let numeric = RecordId::Number(n);
            if self.map.contains_key(&numeric) || self.forbidden.contains(&numeric) {
                return numeric;
            }
        }
        RecordId::Text(raw.to_string())
    }

    /// Requests touching `id` will be answered with 403.
    pub fn forbid(&self, id: RecordId) {
        self.forbidden.insert(id);
    }

    pub fn is_forbidden(&self, id: &RecordId) -> bool {
        self.forbidden.contains(id)
    }

    /// Stores an order exactly as given, keeping its id.
    pub fn seed(&self, order: Order) -> Order {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.map.insert(order.id.clone(), (seq, order.clone()));
        order
    }

    pub fn create(&self, data: Value) -> Result<Order, StubError> {
        let mut fields = into_object(data)?;
        let items = match fields.remove("items") {
            Some(Value::Array(raw)) => raw
                .into_iter()
                .map(new_item)
                .collect::<Result<Vec<_>, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(StubError::BadRequest("items must be an array".into())),
        };
        for key in RESERVED {
            fields.remove(key);
        }
        fields.insert("createdAt".into(), Value::String(now()));

        Ok(self.seed(Order {
            id: RecordId::Text(Uuid::new_v4().to_string()),
            items,
            fields,
        }))
    }

    pub fn get(&self, id: &RecordId) -> Option<Order> {
        self.map.get(id).map(|r| r.value().1.clone())
    }

    pub fn list(&self, req: &PageRequest) -> PageEnvelope<Order> {
        let mut rows = self.rows();
        if let Some((field, direction)) = &req.sort {
            rows.sort_by(|a, b| {
                let ord = compare_fields(a.field(field), b.field(field));
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let size = if req.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            req.size
        };
        let total_pages = (rows.len() as u32).div_ceil(size).max(1);
        let content = rows
            .into_iter()
            .skip((req.page as usize).saturating_mul(size as usize))
            .take(size as usize)
            .collect();

        PageEnvelope {
            content,
            number: Some(req.page),
            size: Some(size),
            total_pages: Some(total_pages),
        }
    }

    /// Orders whose `userId` field matches `user_id`.
    pub fn list_by_user(&self, user_id: &str) -> Vec<Order> {
        self.rows()
            .into_iter()
            .filter(|o| match o.field("userId") {
                Some(Value::String(s)) => s == user_id,
                Some(Value::Number(n)) => n.to_string() == user_id,
                _ => false,
            })
            .collect()
    }

    /// Merges top-level fields into the order. `id`, `items` and
    /// `createdAt` are not writable.
    pub fn update(&self, id: &RecordId, data: Value) -> Result<Option<Order>, StubError> {
        let patch = into_object(data)?;
        let Some(mut entry) = self.map.get_mut(id) else {
            return Ok(None);
        };
        let order = &mut entry.value_mut().1;
        for (k, v) in patch {
            if !RESERVED.contains(&k.as_str()) {
                order.fields.insert(k, v);
            }
        }
        order.fields.insert("updatedAt".into(), Value::String(now()));
        Ok(Some(order.clone()))
    }

    pub fn delete(&self, id: &RecordId) -> bool {
        self.map.remove(id).is_some()
    }

    pub fn add_item(&self, order_id: &RecordId, data: Value) -> Result<Option<OrderItem>, StubError> {
        let item = new_item(data)?;
        let Some(mut entry) = self.map.get_mut(order_id) else {
            return Ok(None);
        };
        entry.value_mut().1.push_item(item.clone());
        Ok(Some(item))
    }

    /// `None` when the order is unknown, `Some(false)` when the item is.
    pub fn remove_item(&self, order_id: &RecordId, item_id: &RecordId) -> Option<bool> {
        let mut entry = self.map.get_mut(order_id)?;
        Some(entry.value_mut().1.remove_item(item_id))
    }

    fn rows(&self) -> Vec<Order> {
        let mut rows: Vec<(u64, Order)> = self.map.iter().map(|kv| kv.value().clone()).collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, o)| o).collect()
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn into_object(data: Value) -> Result<Map<String, Value>, StubError> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(StubError::BadRequest("expected a JSON object".into())),
    }
}

fn new_item(data: Value) -> Result<OrderItem, StubError> {
    let mut fields = into_object(data)?;
    let id = match fields.remove("id") {
        Some(v) => serde_json::from_value(v)
            .map_err(|e| StubError::BadRequest(format!("invalid item id: {e}")))?,
        None => RecordId::Text(Uuid::new_v4().to_string()),
    };
    Ok(OrderItem { id, fields })
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}
