use serde::{Deserialize, Serialize};

use crate::domain::order::Order;

pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 8;
pub const DEFAULT_TOTAL_PAGES: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    /// `field,direction`, the form the orders API expects in `sort`.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.field, self.direction.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl ListQuery {
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.to_param()));
        }
        params
    }
}

/// Paginated list body: `{content, number, size, totalPages}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub content: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

/// A list endpoint may answer with a bare array or with a page envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OrderListing {
    Bare(Vec<Order>),
    Paged(PageEnvelope<Order>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: DEFAULT_TOTAL_PAGES,
        }
    }
}

impl OrderListing {
    /// Splits the listing into rows and pagination. Missing metadata, and
    /// bare arrays, fall back to `0 / 8 / 1`.
    pub fn into_parts(self) -> (Vec<Order>, PageInfo) {
        match self {
            OrderListing::Bare(orders) => (orders, PageInfo::default()),
            OrderListing::Paged(env) => {
                let info = PageInfo {
                    current_page: env.number.unwrap_or(DEFAULT_PAGE),
                    page_size: env.size.unwrap_or(DEFAULT_PAGE_SIZE),
                    total_pages: env.total_pages.unwrap_or(DEFAULT_TOTAL_PAGES),
                };
                (env.content, info)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_carries_pagination() {
        let listing: OrderListing = serde_json::from_value(json!({
            "content": [{ "id": 1 }, { "id": 2 }],
            "number": 1,
            "size": 2,
            "totalPages": 4
        }))
        .unwrap();
        let (orders, info) = listing.into_parts();
        assert_eq!(orders.len(), 2);
        assert_eq!(
            info,
            PageInfo {
                current_page: 1,
                page_size: 2,
                total_pages: 4
            }
        );
    }

    #[test]
    fn bare_array_uses_defaults() {
        let listing: OrderListing = serde_json::from_value(json!([{ "id": "x" }])).unwrap();
        assert!(matches!(listing, OrderListing::Bare(_)));
        let (orders, info) = listing.into_parts();
        assert_eq!(orders.len(), 1);
        assert_eq!(info, PageInfo::default());
    }

    #[test]
    fn partial_envelope_defaults_missing_fields() {
        let listing: OrderListing =
            serde_json::from_value(json!({ "content": [], "totalPages": 5 })).unwrap();
        let (_, info) = listing.into_parts();
        assert_eq!(info.current_page, 0);
        assert_eq!(info.page_size, 8);
        assert_eq!(info.total_pages, 5);
    }

    #[test]
    fn query_params_include_sort_only_when_set() {
        let plain = ListQuery::page(2, 8).to_params();
        assert_eq!(plain.len(), 2);

        let sorted = ListQuery::page(0, 8)
            .sorted_by("createdAt", SortDirection::Desc)
            .to_params();
        assert_eq!(sorted[2], ("sort", "createdAt,desc".to_string()));
    }

    #[test]
    fn sort_direction_parses_case_insensitively() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
