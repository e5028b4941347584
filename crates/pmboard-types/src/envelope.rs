//! Response envelopes returned by the REST backend
//!
//! List endpoints answer either with a bare JSON array or with
//! `{ "data": [...], "pagination": {...} }`; detail endpoints with
//! `{ "data": {...} }` or the bare object. These are the only accepted
//! shapes: anything else fails to decode.

use serde::{Deserialize, Serialize};

/// Pagination metadata for server-paginated lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    /// Derive metadata for a list of `total` items viewed one page at a time.
    ///
    /// `page` is 1-based. `page_size` of zero is treated as one.
    pub fn compute(total: u64, page: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let page = page.max(1);
        let total_pages = total.div_ceil(page_size);

        Self {
            total,
            page,
            page_size,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// List endpoint payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated {
        data: Vec<T>,
        pagination: PaginationMeta,
    },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    /// Split into items and (server) pagination, if any
    pub fn into_parts(self) -> (Vec<T>, Option<PaginationMeta>) {
        match self {
            ListResponse::Paginated { data, pagination } => (data, Some(pagination)),
            ListResponse::Bare(items) => (items, None),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ListResponse::Paginated { data, .. } => data.len(),
            ListResponse::Bare(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Detail endpoint payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Detail<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Detail<T> {
    pub fn into_inner(self) -> T {
        match self {
            Detail::Wrapped { data } => data,
            Detail::Bare(value) => value,
        }
    }
}

/// `{ "message": "..." }` body used for errors and message-only replies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_compute_pagination() {
        let meta = PaginationMeta::compute(45, 2, 20);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);

        let last = PaginationMeta::compute(45, 3, 20);
        assert!(!last.has_next_page);
    }

    #[test]
    fn test_compute_pagination_empty_list() {
        let meta = PaginationMeta::compute(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn test_list_response_bare_array() {
        let resp: ListResponse<Item> = serde_json::from_str(r#"[{"id":"a"},{"id":"b"}]"#).unwrap();
        let (items, meta) = resp.into_parts();
        assert_eq!(items.len(), 2);
        assert!(meta.is_none());
    }

    #[test]
    fn test_list_response_paginated() {
        let json = r#"{
            "data": [{"id":"a"}],
            "pagination": {"total": 11, "page": 2, "pageSize": 10, "totalPages": 2,
                           "hasNextPage": false, "hasPrevPage": true}
        }"#;
        let resp: ListResponse<Item> = serde_json::from_str(json).unwrap();
        let (items, meta) = resp.into_parts();
        assert_eq!(items, vec![Item { id: "a".into() }]);
        assert_eq!(meta.unwrap().total, 11);
    }

    #[test]
    fn test_list_response_rejects_other_shapes() {
        let result: Result<ListResponse<Item>, _> = serde_json::from_str(r#"{"items": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_detail_both_shapes() {
        let wrapped: Detail<Item> = serde_json::from_str(r#"{"data":{"id":"x"}}"#).unwrap();
        let bare: Detail<Item> = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());
    }
}
