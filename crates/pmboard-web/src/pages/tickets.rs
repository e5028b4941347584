//! Tickets screen (server-paginated)

use super::{base_path, current_role, fmt_date, non_empty, parse_date, project_options, status_options, use_reporter};
use crate::api;
use crate::components::{
    ColumnToggle, EmptyState, FieldMessage, FilterSelect, ListStatus, Pager, SearchBar, SortSelect,
};
use crate::list::{use_list, ListHandle};
use crate::utils::export_as_csv;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use pmboard_core::analytics::{status_label, PRIORITIES, TICKET_STATUSES};
use pmboard_core::list::resources::ticket_spec;
use pmboard_core::list::DEFAULT_PAGE_SIZE;
use pmboard_core::types::{NewTicket, Role, Ticket, TicketPatch, TicketType};
use pmboard_core::validation::validate_ticket;
use pmboard_core::FieldError;

fn type_options() -> Vec<(String, String)> {
    vec![
        ("ISSUE".to_string(), "Issue".to_string()),
        ("TASK".to_string(), "Task".to_string()),
    ]
}

#[component]
pub fn Tickets() -> impl IntoView {
    let reporter = use_reporter();
    let list = use_list(ticket_spec(), DEFAULT_PAGE_SIZE, api::fetch_tickets);
    let projects = project_options();
    let can_create = current_role() != Some(Role::Developer);
    let base = base_path();
    let (creating, set_creating) = signal(false);

    let change_status = move |id: String, status: String| {
        let patch = TicketPatch {
            status: Some(status.clone()),
            ..Default::default()
        };
        let target = id.clone();
        list.optimistic(
            move |items| {
                if let Some(ticket) = items.iter_mut().find(|t| t.id == target) {
                    ticket.status = status;
                }
            },
            async move { api::update_ticket(&id, &patch).await.map(|_| ()) },
            move |e| reporter.error(&e),
        );
    };

    let export = move |_| {
        let rows: Vec<Vec<String>> = list
            .view()
            .items
            .iter()
            .map(|t| {
                vec![
                    t.title.clone(),
                    t.ticket_type.as_str().to_string(),
                    t.status.clone(),
                    t.priority.clone().unwrap_or_default(),
                    t.project_name.clone().unwrap_or_default(),
                    t.assignee_name.clone().unwrap_or_default(),
                    fmt_date(t.due_date),
                ]
            })
            .collect();
        export_as_csv(
            &["Title", "Type", "Status", "Priority", "Project", "Assignee", "Due"],
            &rows,
            "pmboard-tickets",
        );
    };

    view! {
        <div class="page tickets-page">
            <div class="page-header">
                <h2>"Tickets"</h2>
                <div class="page-actions">
                    <button class="export-button" on:click=export>"📥 Export CSV"</button>
                    {can_create.then(|| view! {
                        <button class="btn btn-primary" on:click=move |_| set_creating.update(|v| *v = !*v)>
                            {move || if creating.get() { "Close form" } else { "New ticket" }}
                        </button>
                    })}
                </div>
            </div>

            <Show when=move || creating.get()>
                <TicketForm list projects on_done=Callback::new(move |_| set_creating.set(false)) />
            </Show>

            <div class="search-bar">
                <SearchBar list placeholder="Search tickets..." />
                <FilterSelect list name="status" label="All statuses" options=status_options(&TICKET_STATUSES) />
                <FilterSelect list name="priority" label="All priorities" options=status_options(&PRIORITIES) />
                <FilterSelect list name="type" label="All types" options=type_options() />
                <FilterSelect list name="projectId" label="All projects" options=projects />
                <SortSelect list keys=vec![("createdAt", "Created"), ("dueDate", "Due date")] />
                <ColumnToggle list />
            </div>

            <ListStatus list />

            {move || {
                let view = list.view();
                let query = list.query();
                if view.is_empty() && !list.loading() {
                    return view! { <EmptyState message="No tickets match your filters." /> }.into_any();
                }
                let show = move |c: &str| query.is_column_visible(c);
                view! {
                    <table class="table">
                        <thead>
                            <tr>
                                {show("title").then(|| view! { <th>"Title"</th> })}
                                {show("type").then(|| view! { <th>"Type"</th> })}
                                {show("status").then(|| view! { <th>"Status"</th> })}
                                {show("priority").then(|| view! { <th>"Priority"</th> })}
                                {show("project").then(|| view! { <th>"Project"</th> })}
                                {show("assignee").then(|| view! { <th>"Assignee"</th> })}
                                {show("dueDate").then(|| view! { <th>"Due"</th> })}
                            </tr>
                        </thead>
                        <tbody>
                            {view
                                .items
                                .into_iter()
                                .map(|ticket| {
                                    let Ticket { id, title, ticket_type, status, priority, project_name, assignee_name, due_date, .. } = ticket;
                                    let href = format!("{}/tickets/{}", base, id);
                                    view! {
                                        <tr>
                                            {show("title").then(|| view! { <td><A href=href>{title}</A></td> })}
                                            {show("type").then(|| view! { <td>{ticket_type.as_str()}</td> })}
                                            {show("status").then(|| view! {
                                                <td>
                                                    <StatusSelect
                                                        current=status
                                                        on_change=Callback::new(move |s: String| change_status(id.clone(), s))
                                                    />
                                                </td>
                                            })}
                                            {show("priority").then(|| view! {
                                                <td>{priority.as_deref().map(status_label).unwrap_or_default()}</td>
                                            })}
                                            {show("project").then(|| view! { <td>{project_name.unwrap_or_default()}</td> })}
                                            {show("assignee").then(|| view! { <td>{assignee_name.unwrap_or_default()}</td> })}
                                            {show("dueDate").then(|| view! { <td>{fmt_date(due_date)}</td> })}
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

#[component]
fn StatusSelect(current: String, on_change: Callback<String>) -> impl IntoView {
    view! {
        <select class="status-select" on:change=move |e| on_change.run(event_target_value(&e))>
            {TICKET_STATUSES
                .iter()
                .map(|s| {
                    view! { <option value=*s selected=*s == current>{status_label(s)}</option> }
                })
                .collect_view()}
        </select>
    }
}

#[component]
fn TicketForm(
    list: ListHandle<Ticket>,
    projects: Signal<Vec<(String, String)>>,
    on_done: Callback<()>,
) -> impl IntoView {
    let reporter = use_reporter();
    let (title, set_title) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (kind, set_kind) = signal(String::new());
    let (priority, set_priority) = signal(String::new());
    let (project, set_project) = signal(String::new());
    let (start, set_start) = signal(String::new());
    let (due, set_due) = signal(String::new());
    let errors = RwSignal::new(Vec::<FieldError>::new());
    let (busy, set_busy) = signal(false);
    let (failure, set_failure) = signal(None::<String>);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let ticket = NewTicket {
            title: title.get_untracked().trim().to_string(),
            description: non_empty(description.get_untracked()),
            ticket_type: match kind.get_untracked().as_str() {
                "ISSUE" => Some(TicketType::Issue),
                "TASK" => Some(TicketType::Task),
                _ => None,
            },
            priority: non_empty(priority.get_untracked()),
            project_id: non_empty(project.get_untracked()),
            assignee_id: None,
            start_date: parse_date(&start.get_untracked()),
            due_date: parse_date(&due.get_untracked()),
        };
        let problems = validate_ticket(&ticket);
        let invalid = !problems.is_empty();
        errors.set(problems);
        if invalid {
            return;
        }

        set_busy.set(true);
        set_failure.set(None);
        spawn_local(async move {
            match list.mutate(async move { api::create_ticket(&ticket).await }).await {
                Ok(created) => {
                    reporter.success(format!("Ticket \"{}\" created", created.title));
                    on_done.run(());
                }
                Err(e) if e.requires_sign_in() => reporter.error(&e),
                Err(e) => set_failure.set(Some(e.user_message())),
            }
            set_busy.set(false);
        });
    };

    let select = move |label: &'static str, options: Vec<(String, String)>, set: WriteSignal<String>| {
        view! {
            <select class="filter-select" on:change=move |e| set.set(event_target_value(&e))>
                <option value="">{label}</option>
                {options.into_iter().map(|(v, l)| view! { <option value=v>{l}</option> }).collect_view()}
            </select>
        }
    };

    view! {
        <form class="card form" on:submit=submit>
            <label class="form-field">
                <span>"Title"</span>
                <input prop:value=move || title.get() on:input=move |e| set_title.set(event_target_value(&e)) />
                <FieldMessage errors=errors field="title" />
            </label>
            <label class="form-field">
                <span>"Description"</span>
                <textarea prop:value=move || description.get() on:input=move |e| set_description.set(event_target_value(&e))></textarea>
            </label>
            <div class="form-row">
                <label class="form-field">
                    <span>"Type"</span>
                    {select("Select type", type_options(), set_kind)}
                    <FieldMessage errors=errors field="type" />
                </label>
                <label class="form-field">
                    <span>"Priority"</span>
                    {select("None", status_options(&PRIORITIES), set_priority)}
                </label>
                <label class="form-field">
                    <span>"Project"</span>
                    {move || select("None", projects.get(), set_project)}
                </label>
            </div>
            <div class="form-row">
                <label class="form-field">
                    <span>"Start date"</span>
                    <input type="date" prop:value=move || start.get() on:input=move |e| set_start.set(event_target_value(&e)) />
                </label>
                <label class="form-field">
                    <span>"Due date"</span>
                    <input type="date" prop:value=move || due.get() on:input=move |e| set_due.set(event_target_value(&e)) />
                    <FieldMessage errors=errors field="dueDate" />
                </label>
            </div>
            {move || failure.get().map(|message| view! { <p class="form-error">{message}</p> })}
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>"Create ticket"</button>
        </form>
    }
}
