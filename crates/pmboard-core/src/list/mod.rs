//! Generic resource list: query state, derived view, controller
//!
//! One parametrized implementation of "fetch a collection, then filter,
//! sort and paginate it". Each resource only supplies a [`ListSpec`]
//! (see [`resources`]).

mod controller;
pub mod resources;

pub use controller::{FetchTicket, ListController, ListState, Rollback};

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use pmboard_types::{ListResponse, PaginationMeta};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

/// Default window for client-side pagination
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Page size requested when a caller needs a whole collection
pub const COLLECT_PAGE_SIZE: u64 = 100;

/// Stop following `hasNextPage` after this many pages
const MAX_COLLECT_PAGES: u64 = 1_000;

/// Case-insensitive search field accessor
pub type TextField<T> = fn(&T) -> Option<&str>;
/// Exact-match filter accessor
pub type FilterField<T> = fn(&T) -> Option<&str>;
/// Timestamp used for ordering
pub type SortKey<T> = fn(&T) -> Option<DateTime<Utc>>;

/// Where paging happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationMode {
    /// Fetch everything once, slice locally
    Client,
    /// Send `page`/`pageSize` (and filters) to the backend, trust its envelope
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Query-string value (`sortOrder=asc|desc`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Requested ordering: a sort key named in the [`ListSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// How a resource is searched, filtered, sorted and paged
pub struct ListSpec<T> {
    search_fields: Vec<TextField<T>>,
    filters: Vec<(&'static str, FilterField<T>)>,
    sort_keys: Vec<(&'static str, SortKey<T>)>,
    default_order: SortOrder,
    columns: Vec<&'static str>,
    mode: PaginationMode,
}

impl<T> Default for ListSpec<T> {
    fn default() -> Self {
        Self {
            search_fields: Vec::new(),
            filters: Vec::new(),
            sort_keys: Vec::new(),
            default_order: SortOrder::Desc,
            columns: Vec::new(),
            mode: PaginationMode::Client,
        }
    }
}

impl<T> ListSpec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a searchable text field (the screens use one to four)
    pub fn search(mut self, field: TextField<T>) -> Self {
        self.search_fields.push(field);
        self
    }

    /// Add a named exact-match filter
    pub fn filter(mut self, name: &'static str, field: FilterField<T>) -> Self {
        self.filters.push((name, field));
        self
    }

    /// Add a named timestamp sort key; the first one is the default
    pub fn sort_by(mut self, name: &'static str, key: SortKey<T>) -> Self {
        self.sort_keys.push((name, key));
        self
    }

    pub fn ascending(mut self) -> Self {
        self.default_order = SortOrder::Asc;
        self
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn server_paginated(mut self) -> Self {
        self.mode = PaginationMode::Server;
        self
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn all_columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|(name, _)| *name)
    }

    fn sort_key(&self, sort: Option<&SortSpec>) -> Option<(SortKey<T>, SortOrder)> {
        match sort {
            Some(spec) => self
                .sort_keys
                .iter()
                .find(|(name, _)| *name == spec.field)
                .map(|(_, key)| (*key, spec.order)),
            None => self
                .sort_keys
                .first()
                .map(|(_, key)| (*key, self.default_order)),
        }
    }

    fn matches_search(&self, item: &T, needle: &str) -> bool {
        self.search_fields.iter().any(|field| {
            field(item)
                .map(|value| value.to_lowercase().contains(needle))
                .unwrap_or(false)
        })
    }

    fn matches_filters(&self, item: &T, filters: &BTreeMap<String, String>) -> bool {
        filters.iter().all(|(name, wanted)| {
            match self.filters.iter().find(|(n, _)| *n == name.as_str()) {
                Some((_, field)) => field(item) == Some(wanted.as_str()),
                // Unknown filter names are server-side parameters; ignore locally
                None => true,
            }
        })
    }
}

/// UI-owned query state for one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: String,
    pub filters: BTreeMap<String, String>,
    /// 1-based
    pub page: u64,
    pub page_size: u64,
    pub visible_columns: BTreeSet<String>,
    pub sort: Option<SortSpec>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListQuery {
    pub fn new(page_size: u64) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
            visible_columns: BTreeSet::new(),
            sort: None,
        }
    }

    /// Start with every column of `spec` visible
    pub fn for_spec<T>(spec: &ListSpec<T>, page_size: u64) -> Self {
        let mut query = Self::new(page_size);
        query.visible_columns = spec.columns.iter().map(|c| c.to_string()).collect();
        query
    }

    /// Trimmed, lower-cased search needle; `None` when blank
    pub fn needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    pub fn is_column_visible(&self, column: &str) -> bool {
        self.visible_columns.contains(column)
    }
}

/// The visible page plus its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> ListView<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parameters handed to a fetch function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    /// Fixed per-screen parameters (project id, role scope, ...)
    pub base: BTreeMap<String, String>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub sort: Option<SortSpec>,
}

impl FetchParams {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.insert(key.into(), value.into());
        self
    }

    /// Query-string pairs, in a stable order
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .base
            .iter()
            .chain(self.filters.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize".to_string(), page_size.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sortBy".to_string(), sort.field.clone()));
            pairs.push(("sortOrder".to_string(), sort.order.as_str().to_string()));
        }
        pairs.sort();
        pairs
    }

    /// Cache key: resource plus sorted parameters
    pub fn cache_key(&self, resource: &str) -> String {
        let query = self
            .to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            resource.to_string()
        } else {
            format!("{}?{}", resource, query)
        }
    }
}

/// Fetch every page of a collection, starting at page 1 and following
/// `hasNextPage`. A bare array is taken as the whole collection, and an
/// empty page ends the walk even if the backend claims there is more.
pub async fn collect_pages<T, F, Fut>(
    base: FetchParams,
    page_size: u64,
    mut fetch: F,
) -> Result<Vec<T>, CoreError>
where
    F: FnMut(FetchParams) -> Fut,
    Fut: Future<Output = Result<ListResponse<T>, CoreError>>,
{
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let params = FetchParams {
            page: Some(page),
            page_size: Some(page_size.max(1)),
            ..base.clone()
        };
        let (items, meta) = fetch(params).await?.into_parts();
        let exhausted = items.is_empty();
        all.extend(items);
        match meta {
            Some(meta) if meta.has_next_page && !exhausted && page < MAX_COLLECT_PAGES => page += 1,
            _ => break,
        }
    }
    Ok(all)
}

/// Number of pages for `len` items, `ceil(len / page_size)`
pub fn page_count(len: usize, page_size: u64) -> u64 {
    (len as u64).div_ceil(page_size.max(1))
}

/// The `page`-th (1-based) window of `items`; empty when out of range
pub fn paginate<T>(items: &[T], page: u64, page_size: u64) -> &[T] {
    let page_size = page_size.max(1) as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Search, then exact filters, then sort. Borrowing version of the derivation.
pub fn filter_and_sort<'a, T>(items: &'a [T], query: &ListQuery, spec: &ListSpec<T>) -> Vec<&'a T> {
    let needle = query.needle();
    let mut filtered: Vec<&T> = items
        .iter()
        .filter(|item| match &needle {
            Some(needle) => spec.matches_search(item, needle),
            None => true,
        })
        .filter(|item| spec.matches_filters(item, &query.filters))
        .collect();
    sort_refs(&mut filtered, query, spec);
    filtered
}

/// Order `items` by the query's sort key (or the list default)
fn sort_refs<T>(items: &mut [&T], query: &ListQuery, spec: &ListSpec<T>) {
    if let Some((key, order)) = spec.sort_key(query.sort.as_ref()) {
        // Stable sort; items without a timestamp go last either way
        items.sort_by(|a, b| match (key(a), key(b)) {
            (Some(a), Some(b)) => match order {
                SortOrder::Asc => a.cmp(&b),
                SortOrder::Desc => b.cmp(&a),
            },
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }
}

/// Derive the visible page.
///
/// Client mode filters, sorts and slices locally. Server mode trusts the
/// backend for search, filters and paging, orders the fetched page by the
/// current sort, and mirrors `server_meta` (or describes the fetched items
/// as a single page when the backend sent a bare array).
pub fn derive_view<T: Clone>(
    items: &[T],
    query: &ListQuery,
    spec: &ListSpec<T>,
    server_meta: Option<PaginationMeta>,
) -> ListView<T> {
    match spec.mode {
        PaginationMode::Client => {
            let filtered = filter_and_sort(items, query, spec);
            let pagination =
                PaginationMeta::compute(filtered.len() as u64, query.page, query.page_size);
            let items = paginate(&filtered, query.page, query.page_size)
                .iter()
                .map(|item| (*item).clone())
                .collect();
            ListView { items, pagination }
        }
        PaginationMode::Server => {
            let pagination = server_meta.unwrap_or_else(|| {
                PaginationMeta::compute(items.len() as u64, 1, items.len().max(1) as u64)
            });
            let mut page: Vec<&T> = items.iter().collect();
            sort_refs(&mut page, query, spec);
            ListView {
                items: page.into_iter().cloned().collect(),
                pagination,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        status: &'static str,
        at: Option<DateTime<Utc>>,
    }

    fn row_name(r: &Row) -> Option<&str> {
        Some(r.name)
    }
    fn row_status(r: &Row) -> Option<&str> {
        Some(r.status)
    }
    fn row_at(r: &Row) -> Option<DateTime<Utc>> {
        r.at
    }

    fn spec() -> ListSpec<Row> {
        ListSpec::new()
            .search(row_name)
            .filter("status", row_status)
            .sort_by("createdAt", row_at)
            .columns(&["name", "status"])
    }

    fn day(d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let rows = vec![
            Row { name: "Alpha", status: "DONE", at: day(1) },
            Row { name: "Beta", status: "DONE", at: day(2) },
        ];
        let mut query = ListQuery::new(10);
        query.search = "  LPH ".into();
        let out = filter_and_sort(&rows, &query, &spec());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Alpha");
    }

    #[test]
    fn test_default_sort_descending_missing_last() {
        let rows = vec![
            Row { name: "a", status: "OPEN", at: None },
            Row { name: "b", status: "OPEN", at: day(1) },
            Row { name: "c", status: "OPEN", at: day(3) },
        ];
        let out = filter_and_sort(&rows, &ListQuery::new(10), &spec());
        let names: Vec<_> = out.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_explicit_ascending_sort() {
        let rows = vec![
            Row { name: "late", status: "OPEN", at: day(9) },
            Row { name: "early", status: "OPEN", at: day(2) },
        ];
        let mut query = ListQuery::new(10);
        query.sort = Some(SortSpec {
            field: "createdAt".into(),
            order: SortOrder::Asc,
        });
        let out = filter_and_sort(&rows, &query, &spec());
        assert_eq!(out[0].name, "early");
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 1, 2), &[1, 2]);
        assert_eq!(paginate(&items, 2, 2), &[3]);
        assert!(paginate(&items, 3, 2).is_empty());
        assert_eq!(paginate(&items, 0, 2), &[1, 2]);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }

    #[test]
    fn test_server_mode_mirrors_meta() {
        let rows = vec![Row { name: "x", status: "OPEN", at: None }];
        let spec = spec().server_paginated();
        let meta = PaginationMeta::compute(31, 4, 10);
        let view = derive_view(&rows, &ListQuery::new(10), &spec, Some(meta));
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.pagination, meta);
    }

    #[test]
    fn test_server_mode_sorts_fetched_page() {
        let rows = vec![
            Row { name: "old", status: "OPEN", at: day(1) },
            Row { name: "new", status: "OPEN", at: day(9) },
        ];
        let spec = spec().server_paginated();
        let mut query = ListQuery::new(10);
        query.sort = Some(SortSpec {
            field: "createdAt".into(),
            order: SortOrder::Desc,
        });
        let view = derive_view(&rows, &query, &spec, Some(PaginationMeta::compute(2, 1, 10)));
        let names: Vec<_> = view.items.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["new", "old"]);

        query.sort = Some(SortSpec {
            field: "createdAt".into(),
            order: SortOrder::Asc,
        });
        let view = derive_view(&rows, &query, &spec, None);
        assert_eq!(view.items[0].name, "old");
    }

    #[test]
    fn test_unknown_filter_is_ignored_locally() {
        let rows = vec![Row { name: "x", status: "OPEN", at: None }];
        let mut query = ListQuery::new(10);
        query.filters.insert("projectId".into(), "p1".into());
        assert_eq!(filter_and_sort(&rows, &query, &spec()).len(), 1);
    }

    #[test]
    fn test_query_for_spec_shows_all_columns() {
        let query = ListQuery::for_spec(&spec(), 5);
        assert!(query.is_column_visible("name"));
        assert!(query.is_column_visible("status"));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_fetch_params_cache_key_stable() {
        let mut params = FetchParams::default().with("projectId", "p1");
        params.filters.insert("status".into(), "OPEN".into());
        params.page = Some(2);
        assert_eq!(
            params.cache_key("tickets"),
            "tickets?page=2&projectId=p1&status=OPEN"
        );
        assert_eq!(FetchParams::default().cache_key("users"), "users");

        params.sort = Some(SortSpec {
            field: "dueDate".into(),
            order: SortOrder::Asc,
        });
        assert_eq!(
            params.cache_key("tickets"),
            "tickets?page=2&projectId=p1&sortBy=dueDate&sortOrder=asc&status=OPEN"
        );
    }
}
