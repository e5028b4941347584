//! Notifications with optimistic read marking

use super::{fmt_datetime, use_reporter};
use crate::api;
use crate::components::{EmptyState, FilterSelect, ListStatus, Pager, SearchBar};
use crate::list::use_list;
use leptos::prelude::*;
use pmboard_core::list::resources::notification_spec;
use pmboard_core::list::DEFAULT_PAGE_SIZE;
use pmboard_core::types::Notification;

fn state_options() -> Vec<(String, String)> {
    vec![
        ("unread".to_string(), "Unread".to_string()),
        ("read".to_string(), "Read".to_string()),
    ]
}

#[component]
pub fn Notifications() -> impl IntoView {
    let reporter = use_reporter();
    let list = use_list(notification_spec(), DEFAULT_PAGE_SIZE, api::fetch_notifications);

    let mark_read = move |id: String| {
        let target = id.clone();
        list.optimistic(
            move |items: &mut Vec<Notification>| {
                if let Some(n) = items.iter_mut().find(|n| n.id == target) {
                    n.read = true;
                }
            },
            async move { api::mark_notification_read(&id).await },
            move |e| reporter.error(&e),
        );
    };

    let mark_all = move |_| {
        list.optimistic(
            |items: &mut Vec<Notification>| items.iter_mut().for_each(|n| n.read = true),
            api::mark_all_notifications_read(),
            move |e| reporter.error(&e),
        );
    };

    let unread = move || list.items().iter().filter(|n| !n.read).count();

    view! {
        <div class="page notifications-page">
            <div class="page-header">
                <h2>"Notifications"</h2>
                <div class="page-actions">
                    <span class="badge">{move || format!("{} unread", unread())}</span>
                    <button class="btn btn-secondary" on:click=mark_all disabled=move || unread() == 0>
                        "Mark all read"
                    </button>
                </div>
            </div>

            <div class="search-bar">
                <SearchBar list placeholder="Search notifications..." />
                <FilterSelect list name="state" label="All" options=state_options() />
            </div>

            <ListStatus list />

            {move || {
                let view = list.view();
                if view.is_empty() && !list.loading() {
                    return view! { <EmptyState message="You're all caught up." /> }.into_any();
                }
                view
                    .items
                    .into_iter()
                    .map(|n| {
                        let id = n.id.clone();
                        let read = n.read;
                        view! {
                            <div class="card notification" class:notification-unread=!read>
                                <div class="notification-body">
                                    <strong>{n.title}</strong>
                                    <p>{n.message}</p>
                                    <span class="hint">{fmt_datetime(n.created_at)}</span>
                                </div>
                                {n.link.map(|href| view! { <a class="btn-link" href=href>"Open"</a> })}
                                {(!read).then(|| view! {
                                    <button class="btn btn-secondary btn-small" on:click=move |_| mark_read(id.clone())>
                                        "Mark read"
                                    </button>
                                })}
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}

            <Pager list />
        </div>
    }
}
