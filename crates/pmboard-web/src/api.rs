//! Browser-side REST calls
//!
//! Same boundary rules as the native client in `pmboard-core`: list
//! responses decode as `{ data, pagination }` or a bare array, details as
//! `{ data }` or the bare object, non-2xx bodies as `{ message }`.

use crate::session::active_store;
use gloo_net::http::{Request, RequestBuilder, Response};
use js_sys::Promise;
use pmboard_core::list::{collect_pages, FetchParams, COLLECT_PAGE_SIZE};
use pmboard_core::types::{
    ApiMessage, Assignment, Attachment, Comment, Credentials, Detail, ListResponse, NewComment, NewPhase, NewProject,
    NewTeamUpdate, NewTicket, Notification, Project, ProjectPhase, SignInResponse, TeamUpdate, Ticket, TicketPatch,
    User,
};
use pmboard_core::{CoreError, FieldError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, ProgressEvent, XmlHttpRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;

/// Used when `/app-config.json` is missing (e.g. `trunk serve` with a proxy)
pub const DEFAULT_API_BASE: &str = "/api";

/// Boxed local future, so fetchers can be plain `fn` pointers
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = Result<T, CoreError>>>>;

thread_local! {
    static API_BASE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Served by `pmboard web` next to the SPA
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppConfig {
    api_base_url: String,
}

/// Backend root, resolved once per page load
pub async fn api_base() -> String {
    if let Some(base) = API_BASE.with(|b| b.borrow().clone()) {
        return base;
    }

    let base = match Request::get("/app-config.json").send().await {
        Ok(response) if response.ok() => response
            .json::<AppConfig>()
            .await
            .map(|c| c.api_base_url)
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        _ => DEFAULT_API_BASE.to_string(),
    };
    let base = base.trim_end_matches('/').to_string();
    API_BASE.with(|b| *b.borrow_mut() = Some(base.clone()));
    base
}

async fn url(path: &str) -> String {
    format!("{}/{}", api_base().await, path.trim_start_matches('/'))
}

fn with_auth(builder: RequestBuilder) -> RequestBuilder {
    match active_store().get().token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

fn network_error(e: gloo_net::Error) -> CoreError {
    leptos::logging::warn!("Request failed: {}", e);
    CoreError::fetch("Unable to reach the server. Check your connection and try again.")
}

/// Map transport failures and non-2xx statuses
async fn check(endpoint: &str, sent: Result<Response, gloo_net::Error>) -> Result<Response, CoreError> {
    let response = sent.map_err(network_error)?;
    if response.ok() {
        return Ok(response);
    }
    let message = response
        .json::<ApiMessage>()
        .await
        .map(|m| m.message)
        .unwrap_or_default();
    Err(status_error(endpoint, response.status(), message))
}

fn status_error(endpoint: &str, status: u16, message: String) -> CoreError {
    if status == 401 {
        return CoreError::Unauthenticated { message };
    }
    leptos::logging::warn!("{} failed with {}: {}", endpoint, status, message);
    CoreError::Api { status, message }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, CoreError> {
    let text = response.text().await.map_err(network_error)?;
    serde_json::from_str(&text).map_err(|e| CoreError::UnexpectedShape {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

pub async fn get_list<T: DeserializeOwned>(path: &str, params: FetchParams) -> Result<ListResponse<T>, CoreError> {
    let pairs = params.to_query_pairs();
    let builder = with_auth(Request::get(&url(path).await))
        .query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let response = check(path, builder.send().await).await?;
    decode(path, response).await
}

pub async fn get_detail<T: DeserializeOwned>(path: &str) -> Result<T, CoreError> {
    let response = check(path, with_auth(Request::get(&url(path).await)).send().await).await?;
    decode::<Detail<T>>(path, response).await.map(Detail::into_inner)
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Post,
    Put,
    Patch,
    Delete,
}

async fn builder(verb: Verb, path: &str) -> RequestBuilder {
    let url = url(path).await;
    with_auth(match verb {
        Verb::Post => Request::post(&url),
        Verb::Put => Request::put(&url),
        Verb::Patch => Request::patch(&url),
        Verb::Delete => Request::delete(&url),
    })
}

async fn send_json<B: Serialize, T: DeserializeOwned>(verb: Verb, path: &str, body: &B) -> Result<T, CoreError> {
    let request = builder(verb, path).await.json(body).map_err(network_error)?;
    let response = check(path, request.send().await).await?;
    decode::<Detail<T>>(path, response).await.map(Detail::into_inner)
}

async fn send_empty(verb: Verb, path: &str) -> Result<(), CoreError> {
    check(path, builder(verb, path).await.send().await).await?;
    Ok(())
}

// ----------------------------------------------------------------------
// List fetchers (fn pointers for `ListHandle`)
// ----------------------------------------------------------------------

pub fn fetch_projects(params: FetchParams) -> ApiFuture<ListResponse<Project>> {
    Box::pin(async move { get_list("/projects", params).await })
}

pub fn fetch_tickets(params: FetchParams) -> ApiFuture<ListResponse<Ticket>> {
    Box::pin(async move { get_list("/tickets", params).await })
}

pub fn fetch_users(params: FetchParams) -> ApiFuture<ListResponse<User>> {
    Box::pin(async move { get_list("/users", params).await })
}

pub fn fetch_assignments(params: FetchParams) -> ApiFuture<ListResponse<Assignment>> {
    Box::pin(async move { get_list("/assignments", params).await })
}

pub fn fetch_notifications(params: FetchParams) -> ApiFuture<ListResponse<Notification>> {
    Box::pin(async move { get_list("/notifications", params).await })
}

pub fn fetch_team_updates(params: FetchParams) -> ApiFuture<ListResponse<TeamUpdate>> {
    Box::pin(async move { get_list("/updates", params).await })
}

/// Comments of the ticket named by the `ticketId` base parameter
pub fn fetch_comments(params: FetchParams) -> ApiFuture<ListResponse<Comment>> {
    Box::pin(async move {
        let ticket_id = params.base.get("ticketId").cloned().unwrap_or_default();
        get_list(&format!("/tickets/{}/comments", ticket_id), FetchParams::default()).await
    })
}

// ----------------------------------------------------------------------
// Single calls
// ----------------------------------------------------------------------

pub async fn sign_in(credentials: &Credentials) -> Result<SignInResponse, CoreError> {
    send_json(Verb::Post, "/auth/login", credentials)
        .await
        .map_err(CoreError::into_sign_in_failure)
}

pub async fn fetch_ticket(id: &str) -> Result<Ticket, CoreError> {
    get_detail(&format!("/tickets/{}", id)).await
}

pub async fn create_project(project: &NewProject) -> Result<Project, CoreError> {
    send_json(Verb::Post, "/projects", project).await
}

pub async fn delete_project(id: &str) -> Result<(), CoreError> {
    send_empty(Verb::Delete, &format!("/projects/{}", id)).await
}

pub async fn create_ticket(ticket: &NewTicket) -> Result<Ticket, CoreError> {
    send_json(Verb::Post, "/tickets", ticket).await
}

pub async fn update_ticket(id: &str, patch: &TicketPatch) -> Result<Ticket, CoreError> {
    send_json(Verb::Patch, &format!("/tickets/{}", id), patch).await
}

pub async fn delete_ticket(id: &str) -> Result<(), CoreError> {
    send_empty(Verb::Delete, &format!("/tickets/{}", id)).await
}

pub async fn set_user_active(id: &str, active: bool) -> Result<User, CoreError> {
    send_json(Verb::Put, &format!("/users/{}", id), &serde_json::json!({ "active": active })).await
}

pub async fn add_comment(ticket_id: &str, comment: &NewComment) -> Result<Comment, CoreError> {
    send_json(Verb::Post, &format!("/tickets/{}/comments", ticket_id), comment).await
}

pub async fn delete_comment(id: &str) -> Result<(), CoreError> {
    send_empty(Verb::Delete, &format!("/comments/{}", id)).await
}

pub async fn fetch_attachments(ticket_id: &str) -> Result<Vec<Attachment>, CoreError> {
    get_list(&format!("/tickets/{}/attachments", ticket_id), FetchParams::default())
        .await
        .map(|list| list.into_parts().0)
}

pub async fn download_attachment(id: &str) -> Result<Vec<u8>, CoreError> {
    let path = format!("/attachments/{}/download", id);
    let response = check(&path, with_auth(Request::get(&url(&path).await)).send().await).await?;
    response.binary().await.map_err(network_error)
}

pub async fn mark_notification_read(id: &str) -> Result<(), CoreError> {
    send_empty(Verb::Patch, &format!("/notifications/{}/read", id)).await
}

pub async fn mark_all_notifications_read() -> Result<(), CoreError> {
    send_empty(Verb::Patch, "/notifications/read-all").await
}

pub async fn create_team_update(update: &NewTeamUpdate) -> Result<TeamUpdate, CoreError> {
    send_json(Verb::Post, "/updates", update).await
}

pub async fn fetch_phases(project_id: &str) -> Result<Vec<ProjectPhase>, CoreError> {
    get_list(&format!("/projects/{}/phases", project_id), FetchParams::default())
        .await
        .map(|list| list.into_parts().0)
}

pub async fn create_phase(project_id: &str, phase: &NewPhase) -> Result<ProjectPhase, CoreError> {
    send_json(Verb::Post, &format!("/projects/{}/phases", project_id), phase).await
}

pub async fn delete_phase(id: &str) -> Result<(), CoreError> {
    send_empty(Verb::Delete, &format!("/phases/{}", id)).await
}

fn js_error(e: JsValue) -> CoreError {
    leptos::logging::warn!("Upload setup failed: {:?}", e);
    CoreError::fetch("Unable to start the upload.")
}

/// Multipart upload (`file` field). `on_progress(sent, total)` follows the
/// browser's upload progress events.
pub async fn upload_attachment(
    ticket_id: &str,
    file: web_sys::File,
    on_progress: impl Fn(f64, f64) + 'static,
) -> Result<Attachment, CoreError> {
    if file.size() <= 0.0 {
        return Err(CoreError::Validation {
            errors: vec![FieldError::new("file", "File is empty")],
        });
    }

    let path = format!("/tickets/{}/attachments", ticket_id);
    let target = url(&path).await;
    let xhr = XmlHttpRequest::new().map_err(js_error)?;
    xhr.open("POST", &target).map_err(js_error)?;
    if let Some(token) = active_store().get().token() {
        xhr.set_request_header("Authorization", &format!("Bearer {}", token))
            .map_err(js_error)?;
    }

    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("file", &file, &file.name())
        .map_err(js_error)?;

    let progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
        if event.length_computable() {
            on_progress(event.loaded(), event.total());
        }
    });
    xhr.upload()
        .map_err(js_error)?
        .set_onprogress(Some(progress.as_ref().unchecked_ref()));

    let finished = Promise::new(&mut |resolve, reject| {
        xhr.set_onload(Some(&resolve));
        xhr.set_onerror(Some(&reject));
        xhr.set_onabort(Some(&reject));
    });
    xhr.send_with_opt_form_data(Some(&form)).map_err(js_error)?;
    let outcome = JsFuture::from(finished).await;
    // Progress events stop once the request settles
    drop(progress);

    if outcome.is_err() {
        return Err(CoreError::fetch(
            "Unable to reach the server. Check your connection and try again.",
        ));
    }
    let status = xhr.status().map_err(js_error)?;
    let body = xhr.response_text().map_err(js_error)?.unwrap_or_default();
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiMessage>(&body)
            .map(|m| m.message)
            .unwrap_or_default();
        return Err(status_error(&path, status, message));
    }
    serde_json::from_str::<Detail<Attachment>>(&body)
        .map(Detail::into_inner)
        .map_err(|e| CoreError::UnexpectedShape {
            endpoint: path,
            message: e.to_string(),
        })
}

/// Everything the dashboards aggregate, every page of it
pub async fn fetch_dashboard_data() -> Result<(Vec<Project>, Vec<Ticket>), CoreError> {
    let projects = collect_pages(FetchParams::default(), COLLECT_PAGE_SIZE, |params| {
        get_list::<Project>("/projects", params)
    })
    .await?;
    let tickets = collect_pages(FetchParams::default(), COLLECT_PAGE_SIZE, |params| {
        get_list::<Ticket>("/tickets", params)
    })
    .await?;
    Ok((projects, tickets))
}

/// Format a count compactly (1234 -> "1.2K")
pub fn format_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
