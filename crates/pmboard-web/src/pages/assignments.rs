//! Project assignments (admin)

use super::{fmt_datetime, project_options};
use crate::api;
use crate::components::{EmptyState, FilterSelect, ListStatus, Pager, SearchBar, SortSelect};
use crate::list::use_list;
use leptos::prelude::*;
use pmboard_core::list::resources::assignment_spec;
use pmboard_core::list::DEFAULT_PAGE_SIZE;

#[component]
pub fn Assignments() -> impl IntoView {
    let list = use_list(assignment_spec(), DEFAULT_PAGE_SIZE, api::fetch_assignments);
    let projects = project_options();

    let project_name = move |id: &str| {
        projects
            .with(|options| options.iter().find(|(pid, _)| pid == id).map(|(_, name)| name.clone()))
            .unwrap_or_else(|| id.to_string())
    };

    view! {
        <div class="page assignments-page">
            <div class="page-header">
                <h2>"Assignments"</h2>
            </div>

            <div class="search-bar">
                <SearchBar list placeholder="Search by member or role..." />
                <FilterSelect list name="projectId" label="All projects" options=projects />
                <SortSelect list keys=vec![("assignedAt", "Assigned")] />
            </div>

            <ListStatus list />

            {move || {
                let view = list.view();
                if view.is_empty() && !list.loading() {
                    return view! { <EmptyState message="No assignments yet." /> }.into_any();
                }
                view! {
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Member"</th>
                                <th>"Project"</th>
                                <th>"Role"</th>
                                <th>"Assigned"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {view
                                .items
                                .into_iter()
                                .map(|a| {
                                    view! {
                                        <tr>
                                            <td>{a.user_name.unwrap_or(a.user_id)}</td>
                                            <td>{project_name(&a.project_id)}</td>
                                            <td>{a.project_role.unwrap_or_default()}</td>
                                            <td>{fmt_datetime(a.assigned_at)}</td>
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
