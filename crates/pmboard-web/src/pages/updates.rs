//! Daily and project status updates

use super::{current_role, fmt_datetime, non_empty, project_options, use_reporter};
use crate::api;
use crate::components::{EmptyState, FieldMessage, FilterSelect, ListStatus, Pager, SearchBar};
use crate::list::{use_list, ListHandle};
use leptos::prelude::*;
use leptos::task::spawn_local;
use pmboard_core::list::resources::team_update_spec;
use pmboard_core::list::DEFAULT_PAGE_SIZE;
use pmboard_core::types::{NewTeamUpdate, Role, TeamUpdate, UpdateKind};
use pmboard_core::validation::validate_team_update;
use pmboard_core::FieldError;

fn kind_options() -> Vec<(String, String)> {
    vec![
        ("DAILY".to_string(), "Daily".to_string()),
        ("PROJECT".to_string(), "Project".to_string()),
    ]
}

#[component]
pub fn Updates() -> impl IntoView {
    let list = use_list(team_update_spec(), DEFAULT_PAGE_SIZE, api::fetch_team_updates);
    let projects = project_options();
    // Developers post standups; managers post project reports
    let kind = match current_role() {
        Some(Role::Developer) => UpdateKind::Daily,
        _ => UpdateKind::Project,
    };
    let title = match kind {
        UpdateKind::Daily => "Daily Updates",
        UpdateKind::Project => "Team Updates",
    };

    view! {
        <div class="page updates-page">
            <div class="page-header">
                <h2>{title}</h2>
            </div>

            <UpdateForm list projects kind />

            <div class="search-bar">
                <SearchBar list placeholder="Search updates..." />
                <FilterSelect list name="type" label="All kinds" options=kind_options() />
                <FilterSelect list name="projectId" label="All projects" options=projects />
            </div>

            <ListStatus list />

            {move || {
                let view = list.view();
                if view.is_empty() && !list.loading() {
                    return view! { <EmptyState message="No updates posted yet." /> }.into_any();
                }
                view
                    .items
                    .into_iter()
                    .map(|update| view! { <UpdateCard update /> })
                    .collect_view()
                    .into_any()
            }}

            <Pager list />
        </div>
    }
}

#[component]
fn UpdateCard(update: TeamUpdate) -> impl IntoView {
    let kind = match update.kind {
        UpdateKind::Daily => "Daily",
        UpdateKind::Project => "Project",
    };
    let date = update
        .report_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| fmt_datetime(update.created_at));

    view! {
        <article class="card update-card">
            <header class="update-header">
                <strong>{update.author_name.unwrap_or(update.author_id)}</strong>
                <span class="badge">{kind}</span>
                <span class="hint">{update.project_name.unwrap_or(update.project_id)}</span>
                <span class="hint">{date}</span>
            </header>
            <p>{update.content}</p>
            {update.blockers.map(|b| view! { <p class="blockers">"Blockers: " {b}</p> })}
        </article>
    }
}

#[component]
fn UpdateForm(
    list: ListHandle<TeamUpdate>,
    projects: Signal<Vec<(String, String)>>,
    kind: UpdateKind,
) -> impl IntoView {
    let reporter = use_reporter();
    let (project, set_project) = signal(String::new());
    let (content, set_content) = signal(String::new());
    let (blockers, set_blockers) = signal(String::new());
    let errors = RwSignal::new(Vec::<FieldError>::new());
    let (busy, set_busy) = signal(false);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let update = NewTeamUpdate {
            kind,
            project_id: project.get_untracked(),
            content: content.get_untracked().trim().to_string(),
            blockers: non_empty(blockers.get_untracked()),
        };
        let problems = validate_team_update(&update);
        let invalid = !problems.is_empty();
        errors.set(problems);
        if invalid {
            return;
        }

        set_busy.set(true);
        spawn_local(async move {
            match list.mutate(async move { api::create_team_update(&update).await }).await {
                Ok(_) => {
                    reporter.success("Update posted");
                    set_content.set(String::new());
                    set_blockers.set(String::new());
                }
                Err(e) => reporter.error(&e),
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="card form" on:submit=submit>
            <label class="form-field">
                <span>"Project"</span>
                <select class="filter-select" on:change=move |e| set_project.set(event_target_value(&e))>
                    <option value="">"Select project"</option>
                    {move || {
                        projects
                            .get()
                            .into_iter()
                            .map(|(id, name)| view! { <option value=id>{name}</option> })
                            .collect_view()
                    }}
                </select>
                <FieldMessage errors=errors field="projectId" />
            </label>
            <label class="form-field">
                <span>{match kind { UpdateKind::Daily => "What did you work on?", UpdateKind::Project => "Status" }}</span>
                <textarea prop:value=move || content.get() on:input=move |e| set_content.set(event_target_value(&e))></textarea>
                <FieldMessage errors=errors field="content" />
            </label>
            <label class="form-field">
                <span>"Blockers"</span>
                <input prop:value=move || blockers.get() on:input=move |e| set_blockers.set(event_target_value(&e)) />
            </label>
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>"Post update"</button>
        </form>
    }
}
