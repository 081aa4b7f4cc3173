use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend-assigned identifier. The API is free to use numbers or strings,
/// so both are kept as sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// An order as the backend returns it. Only `id` and `items` are
/// interpreted; everything else round-trips through `fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: RecordId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Order {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn push_item(&mut self, item: OrderItem) {
        self.items.push(item);
    }

    /// Returns `true` when an item was removed.
    pub fn remove_item(&mut self, item_id: &RecordId) -> bool {
        let before = self.items.len();
        self.items.retain(|it| &it.id != item_id);
        self.items.len() != before
    }
}
