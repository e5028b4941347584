//! Reactive wrapper around [`ListController`]
//!
//! The controller owns the state; a version signal tells Leptos when to
//! re-read it. Fetches run on `spawn_local`; the controller discards results
//! that arrive after a newer fetch or after the screen unmounted.

use crate::api::ApiFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pmboard_core::list::{FetchParams, ListQuery, ListView, SortSpec};
use pmboard_core::types::ListResponse;
use pmboard_core::{CoreError, ListController, ListSpec};
use std::future::Future;

pub type ListFetcher<T> = fn(FetchParams) -> ApiFuture<ListResponse<T>>;

/// Copyable handle shared by a list screen's views and handlers
pub struct ListHandle<T: Send + Sync + 'static> {
    controller: StoredValue<ListController<T>>,
    fetcher: ListFetcher<T>,
    version: RwSignal<u64>,
}

impl<T: Send + Sync + 'static> Clone for ListHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for ListHandle<T> {}

/// Create a controller for this screen, load it, and deactivate it on unmount
pub fn use_list<T>(spec: ListSpec<T>, page_size: u64, fetcher: ListFetcher<T>) -> ListHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    use_list_with(ListController::new(spec, page_size), fetcher)
}

/// Same as [`use_list`] for a pre-configured controller (base parameters)
pub fn use_list_with<T>(controller: ListController<T>, fetcher: ListFetcher<T>) -> ListHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    let unmount = controller.clone();
    on_cleanup(move || unmount.deactivate());

    let handle = ListHandle {
        controller: StoredValue::new(controller),
        fetcher,
        version: RwSignal::new(0),
    };
    handle.reload();
    handle
}

impl<T: Clone + Send + Sync + 'static> ListHandle<T> {
    fn controller(&self) -> Option<ListController<T>> {
        self.controller.try_get_value()
    }

    fn bump(&self) {
        // The screen may be gone by the time a fetch resolves
        let _ = self.version.try_update(|v| *v += 1);
    }

    /// Fetch with the current parameters
    pub fn reload(&self) {
        let Some(controller) = self.controller() else {
            return;
        };
        let (ticket, params) = controller.begin_fetch();
        let request = (self.fetcher)(params);
        let handle = *self;
        self.bump();
        spawn_local(async move {
            if controller.commit(ticket, request.await) {
                handle.bump();
            }
        });
    }

    fn read<R>(&self, f: impl FnOnce(&ListController<T>) -> R) -> Option<R> {
        self.version.track();
        self.controller.try_with_value(f)
    }

    pub fn view(&self) -> ListView<T> {
        self.read(|c| c.view()).unwrap_or_else(|| ListView {
            items: Vec::new(),
            pagination: Default::default(),
        })
    }

    pub fn items(&self) -> Vec<T> {
        self.read(|c| c.items()).unwrap_or_default()
    }

    pub fn loading(&self) -> bool {
        self.read(|c| c.is_loading()).unwrap_or(false)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|c| c.error()).flatten()
    }

    pub fn query(&self) -> ListQuery {
        self.read(|c| c.query()).unwrap_or_default()
    }

    pub fn all_columns(&self) -> Vec<&'static str> {
        self.controller
            .try_with_value(|c| c.spec().all_columns().to_vec())
            .unwrap_or_default()
    }

    /// Apply a handler; refetch when it changed the server parameters
    fn apply(&self, f: impl FnOnce(&ListController<T>) -> bool) {
        let refetch = self.controller.try_with_value(f).unwrap_or(false);
        self.bump();
        if refetch {
            self.reload();
        }
    }

    pub fn set_search(&self, search: String) {
        self.apply(|c| c.set_search(search));
    }

    pub fn set_filter(&self, name: &'static str, value: String) {
        self.apply(|c| c.set_filter(name, value));
    }

    pub fn set_page(&self, page: u64) {
        self.apply(|c| c.set_page(page));
    }

    pub fn set_page_size(&self, page_size: u64) {
        self.apply(|c| c.set_page_size(page_size));
    }

    pub fn set_sort(&self, sort: Option<SortSpec>) {
        self.apply(|c| c.set_sort(sort));
    }

    pub fn toggle_column(&self, column: &str) {
        self.apply(|c| {
            c.toggle_column(column);
            false
        });
    }

    /// Pessimistic mutation: await the request, then refetch. The error is
    /// handed back so a dialog can show it inline.
    pub async fn mutate<R, Fut>(&self, request: Fut) -> Result<R, CoreError>
    where
        Fut: Future<Output = Result<R, CoreError>>,
    {
        let controller = self
            .controller()
            .ok_or_else(|| CoreError::fetch("Screen closed"))?;
        let result = controller.mutate_then_reload(request, self.fetcher).await;
        self.bump();
        result
    }

    /// Optimistic mutation: apply locally now, roll back if the request fails
    pub fn optimistic<Fut>(
        &self,
        apply: impl FnOnce(&mut Vec<T>),
        request: Fut,
        on_error: impl FnOnce(CoreError) + 'static,
    ) where
        Fut: Future<Output = Result<(), CoreError>> + 'static,
    {
        let Some(controller) = self.controller() else {
            return;
        };
        let rollback = controller.apply_local(apply);
        self.bump();

        let handle = *self;
        spawn_local(async move {
            if let Err(e) = request.await {
                controller.rollback(rollback, &e);
                handle.bump();
                on_error(e);
            }
        });
    }
}
