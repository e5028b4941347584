//! Users screen (admin)

use super::{fmt_date, use_reporter};
use crate::api;
use crate::components::{EmptyState, FilterSelect, ListStatus, Pager, SearchBar};
use crate::list::use_list;
use leptos::prelude::*;
use pmboard_core::list::resources::user_spec;
use pmboard_core::list::DEFAULT_PAGE_SIZE;
use pmboard_core::types::{Role, User};

fn role_options() -> Vec<(String, String)> {
    Role::ALL
        .iter()
        .map(|r| (r.as_str().to_string(), r.label().to_string()))
        .collect()
}

fn role_label(raw: &str) -> String {
    raw.parse::<Role>()
        .map(|r| r.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[component]
pub fn Users() -> impl IntoView {
    let reporter = use_reporter();
    let list = use_list(user_spec(), DEFAULT_PAGE_SIZE, api::fetch_users);

    let set_active = move |id: String, active: bool| {
        let target = id.clone();
        list.optimistic(
            move |items: &mut Vec<User>| {
                if let Some(user) = items.iter_mut().find(|u| u.id == target) {
                    user.active = active;
                }
            },
            async move { api::set_user_active(&id, active).await.map(|_| ()) },
            move |e| reporter.error(&e),
        );
    };

    view! {
        <div class="page users-page">
            <div class="page-header">
                <h2>"Users"</h2>
            </div>

            <div class="search-bar">
                <SearchBar list placeholder="Search by name or email..." />
                <FilterSelect list name="role" label="All roles" options=role_options() />
            </div>

            <ListStatus list />

            {move || {
                let view = list.view();
                if view.is_empty() && !list.loading() {
                    return view! { <EmptyState message="No users found." /> }.into_any();
                }
                view! {
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Email"</th>
                                <th>"Role"</th>
                                <th>"Joined"</th>
                                <th>"Active"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {view
                                .items
                                .into_iter()
                                .map(|user| {
                                    let id = user.id.clone();
                                    let active = user.active;
                                    view! {
                                        <tr class:row-muted=!active>
                                            <td>{user.name}</td>
                                            <td>{user.email}</td>
                                            <td>{role_label(&user.role)}</td>
                                            <td>{fmt_date(user.created_at)}</td>
                                            <td>
                                                <input
                                                    type="checkbox"
                                                    prop:checked=active
                                                    on:change=move |_| set_active(id.clone(), !active)
                                                />
                                            </td>
                                        </tr>
                                    }
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                }
                .into_any()
            }}

            <Pager list />
        </div>
    }
}
