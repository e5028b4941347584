//! Projects screen: searchable list, create form, delete with confirmation,
//! per-project phases

use super::{current_role, fmt_date, non_empty, parse_date, status_options, use_reporter};
use crate::api;
use crate::components::{
    ColumnToggle, ConfirmDialog, EmptyState, FieldMessage, FilterSelect, ListStatus, Pager, SearchBar, SortSelect,
};
use crate::list::{use_list, ListHandle};
use leptos::prelude::*;
use leptos::task::spawn_local;
use pmboard_core::analytics::{status_label, PROJECT_STATUSES};
use pmboard_core::list::resources::project_spec;
use pmboard_core::list::DEFAULT_PAGE_SIZE;
use pmboard_core::types::{NewPhase, NewProject, Project, ProjectPhase, Role};
use pmboard_core::validation::{project_window, validate_phase, validate_project};
use pmboard_core::FieldError;

#[component]
pub fn Projects() -> impl IntoView {
    let list = use_list(project_spec(), DEFAULT_PAGE_SIZE, api::fetch_projects);
    let can_delete = current_role() == Some(Role::Admin);
    let (creating, set_creating) = signal(false);
    let pending_delete = RwSignal::new(None::<Project>);
    let phases_for = RwSignal::new(None::<Project>);

    view! {
        <div class="page projects-page">
            <div class="page-header">
                <h2>"Projects"</h2>
                <div class="page-actions">
                    <button class="btn btn-primary" on:click=move |_| set_creating.update(|v| *v = !*v)>
                        {move || if creating.get() { "Close form" } else { "New project" }}
                    </button>
                </div>
            </div>

            <Show when=move || creating.get()>
                <ProjectForm list on_done=Callback::new(move |_| set_creating.set(false)) />
            </Show>

            <div class="search-bar">
                <SearchBar list placeholder="Search projects..." />
                <FilterSelect list name="status" label="All statuses" options=status_options(&PROJECT_STATUSES) />
                <SortSelect list keys=vec![("createdAt", "Created"), ("endDate", "End date")] />
                <ColumnToggle list />
            </div>

            <ListStatus list />

            {move || {
                let view = list.view();
                let query = list.query();
                if view.is_empty() && !list.loading() {
                    return view! { <EmptyState message="No projects match your filters." /> }.into_any();
                }
                let show = move |c: &str| query.is_column_visible(c);
                view! {
                    <table class="table">
                        <thead>
                            <tr>
                                {show("name").then(|| view! { <th>"Name"</th> })}
                                {show("status").then(|| view! { <th>"Status"</th> })}
                                {show("manager").then(|| view! { <th>"Manager"</th> })}
                                {show("startDate").then(|| view! { <th>"Start"</th> })}
                                {show("endDate").then(|| view! { <th>"End"</th> })}
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {view
                                .items
                                .into_iter()
                                .map(|project| {
                                    let target = project.clone();
                                    let phase_target = project.clone();
                                    view! {
                                        <tr>
                                            {show("name").then(|| view! { <td>{project.name.clone()}</td> })}
                                            {show("status").then(|| view! {
                                                <td><span class="badge">{status_label(&project.status)}</span></td>
                                            })}
                                            {show("manager").then(|| view! {
                                                <td>{project.manager_name.clone().unwrap_or_default()}</td>
                                            })}
                                            {show("startDate").then(|| view! { <td>{fmt_date(project.start_date)}</td> })}
                                            {show("endDate").then(|| view! { <td>{fmt_date(project.end_date)}</td> })}
                                            <td class="row-actions">
                                                <button
                                                    class="btn btn-small"
                                                    on:click=move |_| phases_for.set(Some(phase_target.clone()))
                                                >
                                                    "Phases"
                                                </button>
                                                {can_delete.then(|| view! {
                                                    <button
                                                        class="btn btn-danger btn-small"
                                                        on:click=move |_| pending_delete.set(Some(target.clone()))
                                                    >
                                                        "Delete"
                                                    </button>
                                                })}
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

            {move || phases_for.get().map(|project| view! { <PhasePanel project phases_for /> })}

            {move || pending_delete.get().map(|project| view! { <DeleteProject list project pending_delete /> })}
        </div>
    }
}

#[component]
fn ProjectForm(list: ListHandle<Project>, on_done: Callback<()>) -> impl IntoView {
    let reporter = use_reporter();
    let (name, set_name) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (start, set_start) = signal(String::new());
    let (end, set_end) = signal(String::new());
    let errors = RwSignal::new(Vec::<FieldError>::new());
    let (busy, set_busy) = signal(false);
    let (failure, set_failure) = signal(None::<String>);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let project = NewProject {
            name: name.get_untracked().trim().to_string(),
            description: non_empty(description.get_untracked()),
            start_date: parse_date(&start.get_untracked()),
            end_date: parse_date(&end.get_untracked()),
            manager_id: None,
        };
        let problems = validate_project(&project);
        let invalid = !problems.is_empty();
        errors.set(problems);
        if invalid {
            return;
        }

        set_busy.set(true);
        set_failure.set(None);
        spawn_local(async move {
            match list.mutate(async move { api::create_project(&project).await }).await {
                Ok(created) => {
                    reporter.success(format!("Project \"{}\" created", created.name));
                    on_done.run(());
                }
                Err(e) if e.requires_sign_in() => reporter.error(&e),
                Err(e) => set_failure.set(Some(e.user_message())),
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="card form" on:submit=submit>
            <label class="form-field">
                <span>"Name"</span>
                <input prop:value=move || name.get() on:input=move |e| set_name.set(event_target_value(&e)) />
                <FieldMessage errors=errors field="name" />
            </label>
            <label class="form-field">
                <span>"Description"</span>
                <textarea prop:value=move || description.get() on:input=move |e| set_description.set(event_target_value(&e))></textarea>
            </label>
            <div class="form-row">
                <label class="form-field">
                    <span>"Start date"</span>
                    <input type="date" prop:value=move || start.get() on:input=move |e| set_start.set(event_target_value(&e)) />
                </label>
                <label class="form-field">
                    <span>"End date"</span>
                    <input type="date" prop:value=move || end.get() on:input=move |e| set_end.set(event_target_value(&e)) />
                    <FieldMessage errors=errors field="endDate" />
                </label>
            </div>
            {move || failure.get().map(|message| view! { <p class="form-error">{message}</p> })}
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>"Create project"</button>
        </form>
    }
}

#[component]
fn DeleteProject(
    list: ListHandle<Project>,
    project: Project,
    pending_delete: RwSignal<Option<Project>>,
) -> impl IntoView {
    let reporter = use_reporter();
    let (busy, set_busy) = signal(false);
    let (failure, set_failure) = signal(None::<String>);
    let id = StoredValue::new(project.id.clone());

    let confirm = Callback::new(move |_| {
        let id = id.get_value();
        set_busy.set(true);
        spawn_local(async move {
            match list.mutate(async move { api::delete_project(&id).await }).await {
                Ok(()) => {
                    reporter.success("Project deleted");
                    pending_delete.set(None);
                }
                Err(e) if e.requires_sign_in() => reporter.error(&e),
                // Keep the dialog open with the server's reason
                Err(e) => set_failure.set(Some(e.user_message())),
            }
            set_busy.set(false);
        });
    });

    view! {
        <ConfirmDialog
            title="Delete project"
            message=format!("Delete \"{}\"? Its tickets and phases go with it.", project.name)
            busy=busy
            error=failure
            on_confirm=confirm
            on_cancel=Callback::new(move |_| pending_delete.set(None))
        />
    }
}

#[component]
fn PhasePanel(project: Project, phases_for: RwSignal<Option<Project>>) -> impl IntoView {
    let reporter = use_reporter();
    let project_id = StoredValue::new(project.id.clone());
    let window = project_window(&project);
    let (version, set_version) = signal(0u32);

    let phases = LocalResource::new(move || {
        let _ = version.get();
        let id = project_id.get_value();
        async move { api::fetch_phases(&id).await }
    });

    let delete = move |phase: ProjectPhase| {
        spawn_local(async move {
            match api::delete_phase(&phase.id).await {
                Ok(()) => {
                    reporter.success(format!("Phase \"{}\" deleted", phase.name));
                    set_version.update(|v| *v += 1);
                }
                Err(e) => reporter.error(&e),
            }
        });
    };

    view! {
        <section class="card phase-panel">
            <div class="card-header">
                <h3>{format!("Phases of {}", project.name)}</h3>
                <button class="btn btn-small" on:click=move |_| phases_for.set(None)>"Close"</button>
            </div>
            <Suspense fallback=|| view! { <div class="loading">"Loading phases..."</div> }>
                {move || {
                    phases
                        .read().as_ref()
                        .map(|result| match result.as_ref() {
                            Ok(list) if list.is_empty() => {
                                view! { <EmptyState message="No phases yet." /> }.into_any()
                            }
                            Ok(list) => view! {
                                <table class="table">
                                    <thead>
                                        <tr><th>"Name"</th><th>"Start"</th><th>"End"</th><th></th></tr>
                                    </thead>
                                    <tbody>
                                        {list
                                            .iter()
                                            .cloned()
                                            .map(|phase| {
                                                let target = phase.clone();
                                                view! {
                                                    <tr>
                                                        <td>{phase.name.clone()}</td>
                                                        <td>{fmt_date(Some(phase.start_date))}</td>
                                                        <td>{fmt_date(Some(phase.end_date))}</td>
                                                        <td>
                                                            <button
                                                                class="btn btn-danger btn-small"
                                                                on:click=move |_| delete(target.clone())
                                                            >
                                                                "Delete"
                                                            </button>
                                                        </td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()}
                                    </tbody>
                                </table>
                            }
                            .into_any(),
                            Err(e) => view! { <p class="form-error">{e.user_message()}</p> }.into_any(),
                        })
                }}
            </Suspense>
            <PhaseForm project_id window on_created=Callback::new(move |_| set_version.update(|v| *v += 1)) />
        </section>
    }
}

#[component]
fn PhaseForm(
    project_id: StoredValue<String>,
    window: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    on_created: Callback<()>,
) -> impl IntoView {
    let reporter = use_reporter();
    let (name, set_name) = signal(String::new());
    let (start, set_start) = signal(String::new());
    let (end, set_end) = signal(String::new());
    let errors = RwSignal::new(Vec::<FieldError>::new());
    let (busy, set_busy) = signal(false);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let phase = NewPhase {
            name: name.get_untracked().trim().to_string(),
            description: None,
            start_date: parse_date(&start.get_untracked()),
            end_date: parse_date(&end.get_untracked()),
        };
        let problems = validate_phase(&phase, window);
        let invalid = !problems.is_empty();
        errors.set(problems);
        if invalid {
            return;
        }

        set_busy.set(true);
        let id = project_id.get_value();
        spawn_local(async move {
            match api::create_phase(&id, &phase).await {
                Ok(created) => {
                    reporter.success(format!("Phase \"{}\" added", created.name));
                    set_name.set(String::new());
                    on_created.run(());
                }
                Err(e) => reporter.error(&e),
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="form form-inline" on:submit=submit>
            <label class="form-field">
                <span>"Phase"</span>
                <input prop:value=move || name.get() on:input=move |e| set_name.set(event_target_value(&e)) />
                <FieldMessage errors=errors field="name" />
            </label>
            <label class="form-field">
                <span>"Start"</span>
                <input type="date" prop:value=move || start.get() on:input=move |e| set_start.set(event_target_value(&e)) />
                <FieldMessage errors=errors field="startDate" />
            </label>
            <label class="form-field">
                <span>"End"</span>
                <input type="date" prop:value=move || end.get() on:input=move |e| set_end.set(event_target_value(&e)) />
                <FieldMessage errors=errors field="endDate" />
            </label>
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>"Add phase"</button>
        </form>
    }
}
