//! Stateful list controller shared between a screen and its fetches
//!
//! State lives behind `Arc<parking_lot::RwLock<_>>` so handlers can be
//! called from event callbacks while a fetch is in flight. Locks are never
//! held across an `.await`.

use super::{FetchParams, ListQuery, ListSpec, ListView, PaginationMode, SortSpec, derive_view};
use crate::error::CoreError;
use parking_lot::RwLock;
use pmboard_types::{ListResponse, PaginationMeta};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a list screen renders from
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<T>,
    /// Envelope from the last committed server-mode fetch
    pub server_pagination: Option<PaginationMeta>,
    pub query: ListQuery,
    /// Bumped by every fetch; only the latest may commit
    generation: u64,
    /// Cleared on unmount; nothing commits afterwards
    active: bool,
}

/// Handed out when a fetch starts, presented back when it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Generic list controller: one instance per screen
pub struct ListController<T> {
    spec: Arc<ListSpec<T>>,
    base_params: Arc<BTreeMap<String, String>>,
    state: Arc<RwLock<ListState<T>>>,
}

impl<T> Clone for ListController<T> {
    fn clone(&self) -> Self {
        Self {
            spec: Arc::clone(&self.spec),
            base_params: Arc::clone(&self.base_params),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone> ListController<T> {
    pub fn new(spec: ListSpec<T>, page_size: u64) -> Self {
        let query = ListQuery::for_spec(&spec, page_size);
        Self {
            spec: Arc::new(spec),
            base_params: Arc::new(BTreeMap::new()),
            state: Arc::new(RwLock::new(ListState {
                loading: false,
                error: None,
                items: Vec::new(),
                server_pagination: None,
                query,
                generation: 0,
                active: true,
            })),
        }
    }

    /// Fixed parameter sent with every fetch (e.g. `projectId`)
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.base_params).insert(key.into(), value.into());
        self
    }

    pub fn spec(&self) -> &ListSpec<T> {
        &self.spec
    }

    pub fn state(&self) -> ListState<T> {
        self.state.read().clone()
    }

    pub fn query(&self) -> ListQuery {
        self.state.read().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn is_active(&self) -> bool {
        self.state.read().active
    }

    /// Raw fetched collection
    pub fn items(&self) -> Vec<T> {
        self.state.read().items.clone()
    }

    /// Visible page and its pagination metadata
    pub fn view(&self) -> ListView<T> {
        let state = self.state.read();
        derive_view(&state.items, &state.query, &self.spec, state.server_pagination)
    }

    fn server_mode(&self) -> bool {
        self.spec.mode() == PaginationMode::Server
    }

    // ------------------------------------------------------------------
    // Handlers. Each returns true when the fetch parameters changed and the
    // caller should load again (server mode only).
    // ------------------------------------------------------------------

    pub fn set_search(&self, search: impl Into<String>) -> bool {
        let mut state = self.state.write();
        state.query.search = search.into();
        state.query.page = 1;
        self.server_mode()
    }

    /// Set an exact-match filter; an empty value clears it
    pub fn set_filter(&self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        let value = value.into();
        let mut state = self.state.write();
        if value.is_empty() {
            state.query.filters.remove(&name);
        } else {
            state.query.filters.insert(name, value);
        }
        state.query.page = 1;
        self.server_mode()
    }

    pub fn clear_filter(&self, name: &str) -> bool {
        let mut state = self.state.write();
        let removed = state.query.filters.remove(name).is_some();
        if removed {
            state.query.page = 1;
        }
        removed && self.server_mode()
    }

    pub fn set_page(&self, page: u64) -> bool {
        self.state.write().query.page = page.max(1);
        self.server_mode()
    }

    pub fn set_page_size(&self, page_size: u64) -> bool {
        let mut state = self.state.write();
        state.query.page_size = page_size.max(1);
        state.query.page = 1;
        self.server_mode()
    }

    /// Client mode sorts locally; server mode also sends the sort so the
    /// backend can order across pages
    pub fn set_sort(&self, sort: Option<SortSpec>) -> bool {
        let mut state = self.state.write();
        if state.query.sort == sort {
            return false;
        }
        state.query.sort = sort;
        self.server_mode()
    }

    /// Flip a column's visibility; returns whether it is now visible
    pub fn toggle_column(&self, column: &str) -> bool {
        let mut state = self.state.write();
        let columns = &mut state.query.visible_columns;
        if columns.remove(column) {
            false
        } else {
            columns.insert(column.to_string());
            true
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Parameters for the next fetch
    pub fn fetch_params(&self) -> FetchParams {
        let state = self.state.read();
        let mut params = FetchParams {
            base: (*self.base_params).clone(),
            ..Default::default()
        };
        if self.server_mode() {
            let query = &state.query;
            let search = query.search.trim();
            params.search = (!search.is_empty()).then(|| search.to_string());
            params.filters = query.filters.clone();
            params.page = Some(query.page);
            params.page_size = Some(query.page_size);
            params.sort = query.sort.clone();
        }
        params
    }

    /// Start a fetch: supersedes any fetch still in flight
    pub fn begin_fetch(&self) -> (FetchTicket, FetchParams) {
        let params = self.fetch_params();
        let mut state = self.state.write();
        state.generation += 1;
        state.loading = true;
        state.error = None;
        debug!(generation = state.generation, "List fetch started");
        (
            FetchTicket {
                generation: state.generation,
            },
            params,
        )
    }

    /// Apply a fetch result. Returns false (and changes nothing) when the
    /// ticket was superseded or the controller was deactivated.
    pub fn commit(&self, ticket: FetchTicket, result: Result<ListResponse<T>, CoreError>) -> bool {
        let mut state = self.state.write();
        if !state.active || ticket.generation != state.generation {
            debug!(
                ticket = ticket.generation,
                current = state.generation,
                active = state.active,
                "Discarding stale list result"
            );
            return false;
        }

        state.loading = false;
        match result {
            Ok(response) => {
                let (items, pagination) = response.into_parts();
                state.items = items;
                state.server_pagination = if self.server_mode() { pagination } else { None };
                state.error = None;
            }
            Err(e) => {
                warn!(error = %e, "List fetch failed");
                state.error = Some(e.user_message());
            }
        }
        true
    }

    /// Fetch with `fetch` and commit if still current. Returns whether the
    /// result was committed.
    pub async fn load<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnOnce(FetchParams) -> Fut,
        Fut: Future<Output = Result<ListResponse<T>, CoreError>>,
    {
        let (ticket, params) = self.begin_fetch();
        let result = fetch(params).await;
        self.commit(ticket, result)
    }

    /// Manual retry after an error, or refresh after outside changes
    pub async fn reload<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnOnce(FetchParams) -> Fut,
        Fut: Future<Output = Result<ListResponse<T>, CoreError>>,
    {
        self.load(fetch).await
    }

    /// Unmount: in-flight fetches will not commit
    pub fn deactivate(&self) {
        self.state.write().active = false;
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Pessimistic mutation: await the request, then refetch the list.
    ///
    /// A failed request is returned to the caller untouched (the list error
    /// is not set) so a confirm dialog can stay open and show it inline.
    pub async fn mutate_then_reload<R, M, F, Fut>(&self, mutation: M, fetch: F) -> Result<R, CoreError>
    where
        M: Future<Output = Result<R, CoreError>>,
        F: FnOnce(FetchParams) -> Fut,
        Fut: Future<Output = Result<ListResponse<T>, CoreError>>,
    {
        let value = mutation.await?;
        self.load(fetch).await;
        Ok(value)
    }

    /// Apply a local change ahead of its request. Keep the returned
    /// [`Rollback`] until the request settles.
    pub fn apply_local(&self, apply: impl FnOnce(&mut Vec<T>)) -> Rollback<T> {
        let mut state = self.state.write();
        let snapshot = state.items.clone();
        apply(&mut state.items);
        Rollback {
            snapshot,
            generation: state.generation,
        }
    }

    /// Undo a local change after its request failed. Skipped when a newer
    /// fetch has replaced the items in the meantime.
    pub fn rollback(&self, rollback: Rollback<T>, error: &CoreError) {
        let mut state = self.state.write();
        if state.active && state.generation == rollback.generation {
            state.items = rollback.snapshot;
            state.error = Some(error.user_message());
        }
        warn!(error = %error, "Optimistic update rolled back");
    }

    /// Optimistic mutation: apply locally, await the request, roll back on
    /// failure
    pub async fn apply_optimistic<A, R, Fut>(&self, apply: A, request: Fut) -> Result<R, CoreError>
    where
        A: FnOnce(&mut Vec<T>),
        Fut: Future<Output = Result<R, CoreError>>,
    {
        let rollback = self.apply_local(apply);
        match request.await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.rollback(rollback, &e);
                Err(e)
            }
        }
    }
}

/// Snapshot taken by [`ListController::apply_local`]
#[derive(Debug)]
pub struct Rollback<T> {
    snapshot: Vec<T>,
    generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListSpec;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u32,
        read: bool,
    }

    fn controller() -> ListController<Note> {
        ListController::new(ListSpec::new().columns(&["id", "read"]), 2)
    }

    fn notes(n: u32) -> ListResponse<Note> {
        ListResponse::Bare((1..=n).map(|id| Note { id, read: false }).collect())
    }

    #[tokio::test]
    async fn test_load_commits_and_paginates() {
        let ctrl = controller();
        assert!(ctrl.load(|_| async { Ok(notes(5)) }).await);

        let view = ctrl.view();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.pagination.total, 5);
        assert_eq!(view.pagination.total_pages, 3);
        assert!(!ctrl.is_loading());
    }

    #[tokio::test]
    async fn test_failed_fetch_sets_error_and_stops_loading() {
        let ctrl = controller();
        ctrl.load(|_| async { Ok(notes(3)) }).await;
        ctrl.load(|_| async {
            Err(CoreError::Api {
                status: 500,
                message: "Database unavailable".into(),
            })
        })
        .await;

        assert!(!ctrl.is_loading());
        assert_eq!(ctrl.error().as_deref(), Some("Database unavailable"));
        // Previous items stay on screen
        assert_eq!(ctrl.items().len(), 3);

        ctrl.reload(|_| async { Ok(notes(1)) }).await;
        assert!(ctrl.error().is_none());
    }

    #[tokio::test]
    async fn test_deactivated_controller_ignores_results() {
        let ctrl = controller();
        let (ticket, _) = ctrl.begin_fetch();
        ctrl.deactivate();
        assert!(!ctrl.commit(ticket, Ok(notes(4))));
        assert!(ctrl.items().is_empty());
    }

    #[test]
    fn test_handlers_reset_page() {
        let ctrl = controller();
        ctrl.set_page(3);
        assert!(!ctrl.set_search("x"), "client mode never asks for a refetch");
        assert_eq!(ctrl.query().page, 1);

        ctrl.set_page(2);
        ctrl.set_page_size(25);
        assert_eq!(ctrl.query().page, 1);
        assert_eq!(ctrl.query().page_size, 25);
    }

    #[test]
    fn test_toggle_column() {
        let ctrl = controller();
        assert!(!ctrl.toggle_column("read"));
        assert!(!ctrl.query().is_column_visible("read"));
        assert!(ctrl.toggle_column("read"));
    }

    #[test]
    fn test_server_mode_params_and_refetch() {
        let ctrl = ListController::<Note>::new(ListSpec::new().server_paginated(), 20)
            .with_param("projectId", "p9");
        assert!(ctrl.set_search("  crash "));
        assert!(ctrl.set_filter("status", "OPEN"));
        assert!(ctrl.set_page(4));

        let params = ctrl.fetch_params();
        assert_eq!(params.search.as_deref(), Some("crash"));
        assert_eq!(params.page, Some(4));
        assert_eq!(params.page_size, Some(20));
        assert_eq!(params.base.get("projectId").map(String::as_str), Some("p9"));

        assert!(ctrl.set_filter("status", ""));
        assert!(ctrl.fetch_params().filters.is_empty());
    }

    #[test]
    fn test_client_mode_params_only_base() {
        let ctrl = controller().with_param("role", "developer");
        ctrl.set_search("abc");
        let params = ctrl.fetch_params();
        assert!(params.search.is_none());
        assert!(params.page.is_none());
        assert_eq!(params.base.len(), 1);
    }

    #[tokio::test]
    async fn test_optimistic_update_rolls_back_on_failure() {
        let ctrl = controller();
        ctrl.load(|_| async { Ok(notes(2)) }).await;

        let result: Result<(), CoreError> = ctrl
            .apply_optimistic(
                |items| items.iter_mut().for_each(|n| n.read = true),
                async { Err(CoreError::fetch("offline")) },
            )
            .await;

        assert!(result.is_err());
        assert!(ctrl.items().iter().all(|n| !n.read));
        assert_eq!(ctrl.error().as_deref(), Some("offline"));
    }

    #[tokio::test]
    async fn test_optimistic_update_kept_on_success() {
        let ctrl = controller();
        ctrl.load(|_| async { Ok(notes(2)) }).await;

        ctrl.apply_optimistic(
            |items| {
                if let Some(n) = items.iter_mut().find(|n| n.id == 2) {
                    n.read = true;
                }
            },
            async { Ok::<_, CoreError>(()) },
        )
        .await
        .unwrap();

        let items = ctrl.items();
        assert!(!items[0].read);
        assert!(items[1].read);
    }

    #[tokio::test]
    async fn test_mutate_then_reload_refetches() {
        let ctrl = controller();
        ctrl.load(|_| async { Ok(notes(3)) }).await;

        let deleted = ctrl
            .mutate_then_reload(async { Ok::<_, CoreError>(3u32) }, |_| async { Ok(notes(2)) })
            .await
            .unwrap();

        assert_eq!(deleted, 3);
        assert_eq!(ctrl.items().len(), 2);
    }

    #[tokio::test]
    async fn test_mutate_failure_leaves_list_untouched() {
        let ctrl = controller();
        ctrl.load(|_| async { Ok(notes(3)) }).await;

        let result = ctrl
            .mutate_then_reload(
                async {
                    Err::<(), _>(CoreError::Api {
                        status: 409,
                        message: "Ticket has open subtasks".into(),
                    })
                },
                |_| async { Ok(notes(0)) },
            )
            .await;

        assert_eq!(result.unwrap_err().user_message(), "Ticket has open subtasks");
        assert_eq!(ctrl.items().len(), 3);
        assert!(ctrl.error().is_none());
    }
}
