//! Search, filter, sort, paging and column controls bound to a list handle

use crate::list::ListHandle;
use leptos::prelude::*;
use pmboard_core::list::{SortOrder, SortSpec};

const PAGE_SIZES: [u64; 4] = [10, 20, 50, 100];

/// Free-text search box. Typing resets to page 1.
#[component]
pub fn SearchBar<T>(list: ListHandle<T>, #[prop(into)] placeholder: String) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    view! {
        <div class="search-input-group">
            <input
                type="text"
                class="search-input"
                placeholder=placeholder
                prop:value=move || list.query().search
                on:input=move |e| list.set_search(event_target_value(&e))
            />
        </div>
    }
}

/// Exact-match filter; the empty option clears it
#[component]
pub fn FilterSelect<T>(
    list: ListHandle<T>,
    name: &'static str,
    #[prop(into)] label: String,
    /// `(value, label)` pairs
    #[prop(into)]
    options: Signal<Vec<(String, String)>>,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    let current = move || list.query().filters.get(name).cloned().unwrap_or_default();

    view! {
        <select
            class="filter-select"
            prop:value=current
            on:change=move |e| list.set_filter(name, event_target_value(&e))
        >
            <option value="">{label}</option>
            {move || {
                options
                    .get()
                    .into_iter()
                    .map(|(value, text)| view! { <option value=value>{text}</option> })
                    .collect_view()
            }}
        </select>
    }
}

/// Sort key and direction
#[component]
pub fn SortSelect<T>(
    list: ListHandle<T>,
    /// `(key, label)` pairs, first one is the default
    keys: Vec<(&'static str, &'static str)>,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    let default_key = keys.first().map(|(k, _)| *k).unwrap_or_default();
    let current = move || list.query().sort.unwrap_or(SortSpec {
        field: default_key.to_string(),
        order: SortOrder::Desc,
    });

    let set_field = move |field: String| {
        let order = current().order;
        list.set_sort(Some(SortSpec { field, order }));
    };
    let flip = move |_| {
        let mut sort = current();
        sort.order = match sort.order {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        };
        list.set_sort(Some(sort));
    };

    view! {
        <div class="sort-group">
            <select
                class="filter-select"
                prop:value=move || current().field
                on:change=move |e| set_field(event_target_value(&e))
            >
                {keys
                    .into_iter()
                    .map(|(key, label)| view! { <option value=key>{label}</option> })
                    .collect_view()}
            </select>
            <button class="btn btn-secondary" on:click=flip>
                {move || match current().order {
                    SortOrder::Asc => "↑ Oldest",
                    SortOrder::Desc => "↓ Newest",
                }}
            </button>
        </div>
    }
}

/// Previous/next pager with page size picker
#[component]
pub fn Pager<T>(list: ListHandle<T>) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    let meta = move || list.view().pagination;

    view! {
        <div class="pager">
            <button
                class="btn btn-secondary"
                disabled=move || !meta().has_prev_page
                on:click=move |_| list.set_page(meta().page.saturating_sub(1))
            >
                "← Prev"
            </button>
            <span class="pager-info">
                {move || {
                    let m = meta();
                    format!("Page {} of {} ({} total)", m.page, m.total_pages.max(1), m.total)
                }}
            </span>
            <button
                class="btn btn-secondary"
                disabled=move || !meta().has_next_page
                on:click=move |_| list.set_page(meta().page + 1)
            >
                "Next →"
            </button>
            <select
                class="filter-select"
                prop:value=move || list.query().page_size.to_string()
                on:change=move |e| {
                    if let Ok(size) = event_target_value(&e).parse() {
                        list.set_page_size(size);
                    }
                }
            >
                {PAGE_SIZES
                    .iter()
                    .map(|size| view! { <option value=size.to_string()>{format!("{} / page", size)}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}

/// Checkbox per column
#[component]
pub fn ColumnToggle<T>(list: ListHandle<T>) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    view! {
        <details class="column-toggle">
            <summary>"Columns"</summary>
            {list
                .all_columns()
                .into_iter()
                .map(|column| {
                    view! {
                        <label class="column-option">
                            <input
                                type="checkbox"
                                prop:checked=move || list.query().is_column_visible(column)
                                on:change=move |_| list.toggle_column(column)
                            />
                            {column}
                        </label>
                    }
                })
                .collect_view()}
        </details>
    }
}

/// Loading and error row above a table
#[component]
pub fn ListStatus<T>(list: ListHandle<T>) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    view! {
        <Show when=move || list.loading()>
            <div class="loading">"Loading..."</div>
        </Show>
        {move || {
            list.error()
                .map(|message| {
                    view! {
                        <div class="error-banner">
                            <span>{message}</span>
                            <button class="btn btn-secondary" on:click=move |_| list.reload()>"Retry"</button>
                        </div>
                    }
                })
        }}
    }
}
