//! Single ticket: details, comments, attachments

use super::{fmt_date, fmt_datetime, use_reporter, Reporter};
use crate::api;
use crate::components::{ErrorFallback, FieldMessage, ListStatus};
use crate::list::{use_list_with, ListHandle};
use crate::utils::save_bytes;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pmboard_core::analytics::status_label;
use pmboard_core::list::resources::comment_spec;
use pmboard_core::types::{Attachment, Comment, NewComment, Ticket};
use pmboard_core::validation::validate_comment;
use pmboard_core::{FieldError, ListController};

/// Rebuilt by the router when navigating from one ticket to another
#[component]
pub fn TicketDetail(id: String) -> impl IntoView {
    let reporter = use_reporter();
    let ticket_id = StoredValue::new(id.clone());
    let (version, set_version) = signal(0u32);

    let ticket = LocalResource::new(move || {
        let _ = version.get();
        let id = ticket_id.get_value();
        async move { api::fetch_ticket(&id).await }
    });
    let (attachment_version, set_attachment_version) = signal(0u32);
    let attachments = LocalResource::new(move || {
        let _ = attachment_version.get();
        let id = ticket_id.get_value();
        async move { api::fetch_attachments(&id).await }
    });

    let comments = use_list_with(
        ListController::new(comment_spec(), 100).with_param("ticketId", id),
        api::fetch_comments,
    );

    view! {
        <div class="page ticket-page">
            <Suspense fallback=|| view! { <div class="loading">"Loading ticket..."</div> }>
                {move || {
                    ticket
                        .read().as_ref()
                        .map(|result| match result.as_ref() {
                            Ok(ticket) => view! { <TicketSummary ticket=ticket.clone() /> }.into_any(),
                            Err(e) => view! {
                                <ErrorFallback
                                    error=e.user_message()
                                    on_retry=Callback::new(move |_| set_version.update(|v| *v += 1))
                                />
                            }
                            .into_any(),
                        })
                }}
            </Suspense>

            <section class="card">
                <h3>"Attachments"</h3>
                <Suspense fallback=|| view! { <div class="loading">"Loading..."</div> }>
                    {move || {
                        attachments
                            .read().as_ref()
                            .map(|result| match result.as_ref() {
                                Ok(files) if files.is_empty() => view! { <p class="hint">"No attachments"</p> }.into_any(),
                                Ok(files) => files
                                    .iter()
                                    .cloned()
                                    .map(|file| view! { <AttachmentRow file reporter /> })
                                    .collect_view()
                                    .into_any(),
                                Err(e) => view! { <p class="form-error">{e.user_message()}</p> }.into_any(),
                            })
                    }}
                </Suspense>
                <UploadForm ticket_id on_uploaded=Callback::new(move |_| set_attachment_version.update(|v| *v += 1)) />
            </section>

            <section class="card">
                <h3>"Comments"</h3>
                <ListStatus list=comments />
                <For
                    each=move || comments.view().items
                    key=|comment| comment.id.clone()
                    children=move |comment| view! { <CommentRow comment comments reporter /> }
                />
                <CommentForm ticket_id comments />
            </section>
        </div>
    }
}

#[component]
fn TicketSummary(ticket: Ticket) -> impl IntoView {
    view! {
        <div class="card ticket-summary">
            <h2>{ticket.title}</h2>
            <div class="ticket-meta">
                <span class="badge">{ticket.ticket_type.as_str()}</span>
                <span class="badge">{status_label(&ticket.status)}</span>
                {ticket.priority.map(|p| view! { <span class="badge">{status_label(&p)}</span> })}
            </div>
            <dl class="ticket-fields">
                <dt>"Project"</dt>
                <dd>{ticket.project_name.unwrap_or_default()}</dd>
                <dt>"Assignee"</dt>
                <dd>{ticket.assignee_name.unwrap_or_else(|| "Unassigned".to_string())}</dd>
                <dt>"Start"</dt>
                <dd>{fmt_date(ticket.start_date)}</dd>
                <dt>"Due"</dt>
                <dd>{fmt_date(ticket.due_date)}</dd>
                <dt>"Created"</dt>
                <dd>{fmt_datetime(ticket.created_at)}</dd>
            </dl>
            <p class="ticket-description">{ticket.description.unwrap_or_default()}</p>
        </div>
    }
}

fn format_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1 << 20 => format!("{:.1} MB", b as f64 / (1u64 << 20) as f64),
        b if b >= 1 << 10 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{} B", b),
    }
}

#[component]
fn AttachmentRow(file: Attachment, reporter: Reporter) -> impl IntoView {
    let (busy, set_busy) = signal(false);
    let label = format!("{} ({})", file.file_name, format_size(file.size_bytes));
    let file = StoredValue::new(file);

    let download = move |_| {
        let file = file.get_value();
        set_busy.set(true);
        spawn_local(async move {
            match api::download_attachment(&file.id).await {
                Ok(bytes) => save_bytes(
                    &bytes,
                    &file.file_name,
                    file.mime_type.as_deref().unwrap_or("application/octet-stream"),
                ),
                Err(e) => reporter.error(&e),
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="attachment-row">
            <span>{label}</span>
            <button class="btn btn-secondary btn-small" on:click=download disabled=move || busy.get()>
                {move || if busy.get() { "Downloading..." } else { "Download" }}
            </button>
        </div>
    }
}

#[component]
fn UploadForm(ticket_id: StoredValue<String>, on_uploaded: Callback<()>) -> impl IntoView {
    let reporter = use_reporter();
    let input = NodeRef::<leptos::html::Input>::new();
    // (sent, total) while an upload is in flight
    let progress = RwSignal::new(None::<(f64, f64)>);

    let upload = move |_| {
        let Some(file) = input.get().and_then(|el| el.files()).and_then(|files| files.get(0)) else {
            return;
        };
        let id = ticket_id.get_value();
        progress.set(Some((0.0, file.size())));
        spawn_local(async move {
            let name = file.name();
            let result = api::upload_attachment(&id, file, move |sent, total| progress.set(Some((sent, total)))).await;
            progress.set(None);
            match result {
                Ok(_) => {
                    reporter.success(format!("Uploaded {}", name));
                    if let Some(el) = input.get() {
                        el.set_value("");
                    }
                    on_uploaded.run(());
                }
                Err(e) => reporter.error(&e),
            }
        });
    };

    view! {
        <div class="upload-form">
            <input type="file" node_ref=input disabled=move || progress.get().is_some() />
            <button class="btn btn-primary btn-small" on:click=upload disabled=move || progress.get().is_some()>
                "Upload"
            </button>
            {move || progress.get().map(|(sent, total)| view! {
                <progress class="upload-progress" max=total value=sent></progress>
                <span class="hint">{upload_percent(sent, total)}</span>
            })}
        </div>
    }
}

fn upload_percent(sent: f64, total: f64) -> String {
    if total <= 0.0 {
        return "0%".to_string();
    }
    format!("{:.0}%", (sent / total * 100.0).clamp(0.0, 100.0))
}

#[component]
fn CommentRow(comment: Comment, comments: ListHandle<Comment>, reporter: Reporter) -> impl IntoView {
    let id = StoredValue::new(comment.id.clone());

    let delete = move |_| {
        let id = id.get_value();
        let target = id.clone();
        comments.optimistic(
            move |items| items.retain(|c| c.id != target),
            async move { api::delete_comment(&id).await },
            move |e| reporter.error(&e),
        );
    };

    view! {
        <div class="comment">
            <div class="comment-header">
                <strong>{comment.author_name.unwrap_or_else(|| comment.author_id.clone())}</strong>
                <span class="hint">{fmt_datetime(comment.created_at)}</span>
                <button class="btn-link" on:click=delete>"Delete"</button>
            </div>
            <p>{comment.content}</p>
        </div>
    }
}

#[component]
fn CommentForm(ticket_id: StoredValue<String>, comments: ListHandle<Comment>) -> impl IntoView {
    let reporter = use_reporter();
    let (content, set_content) = signal(String::new());
    let errors = RwSignal::new(Vec::<FieldError>::new());
    let (busy, set_busy) = signal(false);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let comment = NewComment {
            content: content.get_untracked().trim().to_string(),
        };
        let problems = validate_comment(&comment);
        let invalid = !problems.is_empty();
        errors.set(problems);
        if invalid {
            return;
        }

        let id = ticket_id.get_value();
        set_busy.set(true);
        spawn_local(async move {
            match comments.mutate(async move { api::add_comment(&id, &comment).await }).await {
                Ok(_) => set_content.set(String::new()),
                Err(e) => reporter.error(&e),
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="comment-form" on:submit=submit>
            <textarea
                placeholder="Add a comment..."
                prop:value=move || content.get()
                on:input=move |e| set_content.set(event_target_value(&e))
            ></textarea>
            <FieldMessage errors=errors field="content" />
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>"Comment"</button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_percent() {
        assert_eq!(upload_percent(0.0, 0.0), "0%");
        assert_eq!(upload_percent(512.0, 1024.0), "50%");
        assert_eq!(upload_percent(2048.0, 1024.0), "100%");
    }
}
