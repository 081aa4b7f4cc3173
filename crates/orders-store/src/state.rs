use std::collections::HashSet;

use orders_types::domain::order::{Order, OrderItem, RecordId};
use orders_types::domain::page::{PageInfo, DEFAULT_PAGE, DEFAULT_TOTAL_PAGES};

/// The loaded page of orders plus its pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub orders: Vec<Order>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl CollectionState {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            orders: Vec::new(),
            current_page: DEFAULT_PAGE,
            page_size,
            total_pages: DEFAULT_TOTAL_PAGES,
        }
    }

    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.orders.iter().position(|o| &o.id == id)
    }

    pub fn find_mut(&mut self, id: &RecordId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| &o.id == id)
    }

    /// Replaces the page. Repeated ids keep their first occurrence.
    pub fn replace_page(&mut self, orders: Vec<Order>, info: PageInfo) {
        let mut seen = HashSet::with_capacity(orders.len());
        self.orders = orders
            .into_iter()
            .filter(|o| seen.insert(o.id.clone()))
            .collect();
        self.current_page = info.current_page;
        self.page_size = info.page_size;
        self.total_pages = info.total_pages;
    }

    /// Appends a new order; an order already loaded under the same id is
    /// replaced where it stands.
    pub fn append(&mut self, order: Order) {
        match self.position(&order.id) {
            Some(i) => self.orders[i] = order,
            None => self.orders.push(order),
        }
    }

    /// Puts `order` where the order loaded under `id` stands. Returns
    /// `false` when no loaded order has that id.
    pub fn replace(&mut self, id: &RecordId, order: Order) -> bool {
        match self.position(id) {
            Some(i) => {
                self.orders[i] = order;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &RecordId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| &o.id != id);
        self.orders.len() != before
    }

    pub fn push_item(&mut self, order_id: &RecordId, item: OrderItem) -> bool {
        match self.find_mut(order_id) {
            Some(order) => {
                order.push_item(item);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, order_id: &RecordId, item_id: &RecordId) -> bool {
        match self.find_mut(order_id) {
            Some(order) => order.remove_item(item_id),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Everything a view can observe.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderState {
    pub collection: CollectionState,
    pub order: Option<Order>,
    pub status: RequestStatus,
}

impl OrderState {
    pub fn new(page_size: u32) -> Self {
        Self {
            collection: CollectionState::with_page_size(page_size),
            order: None,
            status: RequestStatus::default(),
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.collection.orders
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }
}

impl Default for OrderState {
    fn default() -> Self {
        Self::new(orders_types::domain::page::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(id: i64, label: &str) -> Order {
        serde_json::from_value(json!({ "id": id, "label": label, "items": [] })).unwrap()
    }

    fn collection(ids: &[i64]) -> CollectionState {
        let mut c = CollectionState::with_page_size(8);
        c.orders = ids.iter().map(|&i| order(i, "v1")).collect();
        c
    }

    #[test]
    fn replace_page_drops_repeated_ids() {
        let mut c = CollectionState::with_page_size(8);
        c.replace_page(
            vec![order(1, "a"), order(2, "b"), order(1, "c")],
            PageInfo::default(),
        );
        let ids: Vec<_> = c.orders.iter().map(|o| o.id.to_string()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(c.orders[0].field("label"), Some(&json!("a")));
    }

    #[test]
    fn append_never_duplicates() {
        let mut c = collection(&[1, 2]);
        c.append(order(3, "new"));
        c.append(order(1, "v2"));
        assert_eq!(c.orders.len(), 3);
        assert_eq!(c.orders[0].field("label"), Some(&json!("v2")));
        assert_eq!(c.orders[2].id, RecordId::from(3));
    }

    #[test]
    fn replace_keeps_position_and_ignores_unknown() {
        let mut c = collection(&[1, 2, 3]);
        assert!(c.replace(&RecordId::from(2), order(2, "v2")));
        assert_eq!(c.orders[1].field("label"), Some(&json!("v2")));
        assert_eq!(c.orders[0], order(1, "v1"));
        assert_eq!(c.orders[2], order(3, "v1"));

        let before = c.clone();
        assert!(!c.replace(&RecordId::from(9), order(9, "v2")));
        assert_eq!(c, before);
    }

    #[test]
    fn replace_matches_the_requested_id() {
        let mut c = collection(&[1, 2, 3]);
        assert!(c.replace(&RecordId::from(2), order(20, "renumbered")));
        let ids: Vec<_> = c.orders.iter().map(|o| o.id.to_string()).collect();
        assert_eq!(ids, ["1", "20", "3"]);

        let before = c.clone();
        assert!(!c.replace(&RecordId::from(103), order(3, "v2")));
        assert_eq!(c, before);
    }

    #[test]
    fn remove_is_noop_for_unknown_id() {
        let mut c = collection(&[1, 2]);
        assert!(!c.remove(&RecordId::from(5)));
        assert_eq!(c.orders.len(), 2);
        assert!(c.remove(&RecordId::from(1)));
        assert_eq!(c.orders.len(), 1);
    }

    #[test]
    fn item_changes_need_a_loaded_order() {
        let mut c = collection(&[1]);
        let item: OrderItem = serde_json::from_value(json!({ "id": 40 })).unwrap();

        assert!(!c.push_item(&RecordId::from(2), item.clone()));
        assert!(c.push_item(&RecordId::from(1), item));
        assert_eq!(c.orders[0].items.len(), 1);

        assert!(!c.remove_item(&RecordId::from(2), &RecordId::from(40)));
        assert!(c.remove_item(&RecordId::from(1), &RecordId::from(40)));
        assert!(c.orders[0].items.is_empty());
    }
}
