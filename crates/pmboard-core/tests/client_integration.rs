//! REST client against a local axum backend

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use pmboard_core::client::ProgressFn;
use pmboard_core::list::FetchParams;
use pmboard_core::types::{Credentials, NewAssignment, NewComment, NewPhase, NewTeamUpdate, Role, UpdateKind};
use pmboard_core::{ApiClient, CoreError, MemorySessionStore, PmboardConfig, SessionStore};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

fn project(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "status": "ACTIVE", "createdAt": "2026-01-10T09:00:00Z" })
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (StatusCode::OK, Json(json!({ "token": "tok-123", "role": "project_manager" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid email or password" })))
    }
}

async fn projects(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if bearer(&headers).as_deref() != Some("tok-123") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if query.contains_key("pageSize") {
        return Ok(Json(json!({
            "data": [project("p1", "Apollo"), project("p2", "Gemini")],
            "pagination": { "total": 2, "page": 1, "pageSize": 100, "totalPages": 1,
                            "hasNextPage": false, "hasPrevPage": false }
        })));
    }
    Ok(Json(json!({
        "data": [project("p1", "Apollo"), project("p2", "Gemini")],
        "pagination": { "total": 12, "page": 2, "pageSize": 2, "totalPages": 6,
                        "hasNextPage": true, "hasPrevPage": true }
    })))
}

async fn users() -> Json<Value> {
    Json(json!([
        { "id": "u1", "name": "Ada", "email": "ada@example.com", "role": "developer" }
    ]))
}

async fn project_detail(Path(id): Path<String>) -> Json<Value> {
    if id == "bare" {
        Json(project("bare", "Bare"))
    } else {
        Json(json!({ "data": project(&id, "Wrapped") }))
    }
}

async fn delete_project(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == "locked" {
        (StatusCode::CONFLICT, Json(json!({ "message": "Project has open tickets" })))
    } else {
        (StatusCode::OK, Json(json!({ "message": "Deleted" })))
    }
}

async fn comment(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "data": {
        "id": "c1", "ticketId": id, "authorId": "u1",
        "content": body["content"], "createdAt": "2026-02-01T00:00:00Z"
    }}))
}

async fn comments(Path(id): Path<String>) -> Json<Value> {
    Json(json!([
        { "id": "c1", "ticketId": id, "authorId": "u1", "content": "First", "createdAt": "2026-02-01T00:00:00Z" },
        { "id": "c2", "ticketId": id, "authorId": "u2", "content": "Second", "createdAt": "2026-02-02T00:00:00Z" }
    ]))
}

async fn create_assignment(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "data": {
        "id": "as1", "projectId": body["projectId"], "userId": body["userId"],
        "projectRole": body["projectRole"], "assignedAt": "2026-02-01T00:00:00Z"
    }})))
}

async fn create_update(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "id": "up1", "type": body["type"], "projectId": body["projectId"], "authorId": "u1",
        "content": body["content"], "blockers": body["blockers"], "createdAt": "2026-02-01T00:00:00Z"
    }))
}

const TICKET_STATUSES: [&str; 5] = ["OPEN", "DONE", "IN_PROGRESS", "CLOSED", "OPEN"];

/// Five tickets; the backend caps pages at two rows whatever the client asks
async fn tickets(
    State(hits): State<Arc<AtomicUsize>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let page: u64 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: u64 = 2;
    let rows: Vec<Value> = TICKET_STATUSES
        .iter()
        .enumerate()
        .skip(((page - 1) * size) as usize)
        .take(size as usize)
        .map(|(i, status)| {
            json!({ "id": format!("t{}", i), "title": "Ticket", "type": "TASK",
                    "status": status, "createdAt": "2026-02-01T00:00:00Z" })
        })
        .collect();
    Json(json!({
        "data": rows,
        "pagination": { "total": 5, "page": page, "pageSize": size, "totalPages": 3,
                        "hasNextPage": page < 3, "hasPrevPage": page > 1 }
    }))
}

fn phase(id: &str, project_id: &str, name: &str) -> Value {
    json!({ "id": id, "projectId": project_id, "name": name,
            "startDate": "2026-03-01T00:00:00Z", "endDate": "2026-03-31T00:00:00Z" })
}

async fn phases(Path(id): Path<String>) -> Json<Value> {
    Json(json!([phase("ph1", &id, "Discovery"), phase("ph2", &id, "Build")]))
}

async fn create_phase(Path(id): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    (StatusCode::CREATED, Json(json!({ "data": phase("ph3", &id, &name) })))
}

async fn upload(Path(id): Path<String>, headers: HeaderMap, body: Bytes) -> Result<Json<Value>, StatusCode> {
    let multipart = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    if !multipart || !String::from_utf8_lossy(&body).contains("filename=\"report.csv\"") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({ "data": {
        "id": "a1", "ticketId": id, "fileName": "report.csv",
        "sizeBytes": body.len(), "createdAt": "2026-02-01T00:00:00Z"
    }})))
}

async fn server() -> (String, Arc<AtomicUsize>) {
    let ticket_hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/projects", get(projects))
        .route("/api/projects/{id}", get(project_detail).delete(delete_project))
        .route("/api/projects/{id}/phases", get(phases).post(create_phase))
        .route("/api/phases/{id}", delete(|| async { StatusCode::NO_CONTENT }))
        .route("/api/users", get(users))
        .route("/api/tickets", get(tickets))
        .route("/api/tickets/{id}", delete(|| async { StatusCode::NO_CONTENT }))
        .route("/api/assignments", get(|| async { Json(json!({ "items": 3 })) }).post(create_assignment))
        .route("/api/assignments/{id}", delete(|| async { StatusCode::NO_CONTENT }))
        .route("/api/tickets/{id}/comments", get(comments).post(comment))
        .route("/api/updates", post(create_update))
        .route("/api/tickets/{id}/attachments", post(upload))
        .route("/api/notifications/read-all", patch(|| async { StatusCode::NO_CONTENT }))
        .route("/api/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(Arc::clone(&ticket_hits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), ticket_hits)
}

async fn client_with_hits() -> (ApiClient, Arc<MemorySessionStore>, Arc<AtomicUsize>) {
    let (api_base_url, hits) = server().await;
    let config = PmboardConfig {
        api_base_url,
        ..Default::default()
    };
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(&config, store.clone()).unwrap();
    (client, store, hits)
}

async fn client() -> (ApiClient, Arc<MemorySessionStore>) {
    let (client, store, _) = client_with_hits().await;
    (client, store)
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "pm@example.com".into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn test_sign_in_stores_session_and_sends_bearer() {
    let (client, store) = client().await;

    let session = client.sign_in(&credentials("secret")).await.unwrap();
    assert_eq!(session.role(), Some(Role::ProjectManager));
    assert_eq!(store.get().token(), Some("tok-123"));

    let list = client.projects(&FetchParams::default()).await.unwrap();
    let (items, pagination) = list.into_parts();
    assert_eq!(items.len(), 2);
    let pagination = pagination.unwrap();
    assert_eq!(pagination.total, 12);
    assert!(pagination.has_next_page);
}

#[tokio::test]
async fn test_failed_sign_in_surfaces_backend_message() {
    let (client, store) = client().await;
    let err = client.sign_in(&credentials("nope")).await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(matches!(err, CoreError::Api { status: 401, .. }));
    assert!(!err.requires_sign_in(), "bad credentials are not an expired session");
    assert!(!store.get().is_authenticated());
}

#[tokio::test]
async fn test_invalid_credentials_never_hit_the_network() {
    let (client, _) = client().await;
    let err = client
        .sign_in(&Credentials { email: "not-an-email".into(), password: String::new() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref errors } if errors.len() == 2));
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let (client, _) = client().await;
    let err = client.projects(&FetchParams::default()).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthenticated { .. }));
    assert!(err.requires_sign_in());
    assert!(err.user_message().contains("session has expired"));
}

#[tokio::test]
async fn test_bare_array_list() {
    let (client, _) = client().await;
    let users = client.users(&FetchParams::default()).await.unwrap();
    let (items, pagination) = users.into_parts();
    assert_eq!(items[0].name, "Ada");
    assert!(items[0].active);
    assert!(pagination.is_none());
}

#[tokio::test]
async fn test_detail_accepts_both_envelopes() {
    let (client, _) = client().await;
    assert_eq!(client.project("p7").await.unwrap().name, "Wrapped");
    assert_eq!(client.project("bare").await.unwrap().id, "bare");
}

#[tokio::test]
async fn test_unexpected_shape_names_endpoint() {
    let (client, _) = client().await;
    match client.assignments(&FetchParams::default()).await {
        Err(CoreError::UnexpectedShape { endpoint, .. }) => assert_eq!(endpoint, "/assignments"),
        other => panic!("expected UnexpectedShape, got {:?}", other.map(|l| l.len())),
    }
}

#[tokio::test]
async fn test_api_error_and_fallback_message() {
    let (client, _) = client().await;

    let err = client.delete_project("locked").await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: 409, .. }));
    assert_eq!(err.user_message(), "Project has open tickets");

    client.delete_project("p1").await.unwrap();

    let err = client.download("/broken").await.unwrap_err();
    assert_eq!(err.user_message(), pmboard_core::error::FALLBACK_MESSAGE);
}

#[tokio::test]
async fn test_create_comment_and_empty_response() {
    let (client, _) = client().await;
    let comment = client
        .add_comment("t9", &NewComment { content: "Looks good".into() })
        .await
        .unwrap();
    assert_eq!(comment.ticket_id, "t9");
    assert_eq!(comment.content, "Looks good");

    client.mark_all_notifications_read().await.unwrap();
}

#[tokio::test]
async fn test_comments_listed_per_ticket() {
    let (client, _) = client().await;
    let (comments, meta) = client.comments("t7").await.unwrap().into_parts();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.ticket_id == "t7"));
    assert!(meta.is_none());
}

#[tokio::test]
async fn test_assignment_create_and_remove() {
    let (client, _) = client().await;
    let assignment = client
        .create_assignment(&NewAssignment {
            project_id: "p1".into(),
            user_id: "u1".into(),
            project_role: Some("Backend".into()),
        })
        .await
        .unwrap();
    assert_eq!(assignment.id, "as1");
    assert_eq!(assignment.project_role.as_deref(), Some("Backend"));
    client.delete_assignment("as1").await.unwrap();

    let err = client
        .create_assignment(&NewAssignment::default())
        .await
        .unwrap_err();
    let CoreError::Validation { errors } = err else {
        panic!("expected validation error, got {:?}", err);
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["projectId", "userId"]);
}

#[tokio::test]
async fn test_team_update_posted() {
    let (client, _) = client().await;
    let update = client
        .create_team_update(&NewTeamUpdate {
            kind: UpdateKind::Daily,
            project_id: "p1".into(),
            content: "Finished the importer".into(),
            blockers: Some("Waiting on API keys".into()),
        })
        .await
        .unwrap();
    assert_eq!(update.kind, UpdateKind::Daily);
    assert_eq!(update.blockers.as_deref(), Some("Waiting on API keys"));

    let err = client
        .create_team_update(&NewTeamUpdate {
            kind: UpdateKind::Project,
            project_id: "p1".into(),
            content: "  ".into(),
            blockers: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}

#[tokio::test]
async fn test_all_tickets_follows_every_page() {
    let (client, _, hits) = client_with_hits().await;
    let tickets = client.all_tickets(&FetchParams::default()).await.unwrap();
    let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2", "t3", "t4"]);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_dashboard_data_cached_until_mutation() {
    let (client, store, hits) = client_with_hits().await;
    store.set(pmboard_core::types::Session::new("tok-123", Role::Admin)).unwrap();

    let first = client.dashboard_data().await.unwrap();
    assert_eq!(first.tickets.len(), 5);
    assert_eq!(first.projects.len(), 2);
    let after_first = hits.load(Ordering::SeqCst);

    let second = client.dashboard_data().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(hits.load(Ordering::SeqCst), after_first);

    client.delete_ticket("t0").await.unwrap();
    client.dashboard_data().await.unwrap();
    assert!(hits.load(Ordering::SeqCst) > after_first);
}

#[tokio::test]
async fn test_phase_list_create_delete() {
    let (client, _) = client().await;

    let (phases, _) = client.phases("p7").await.unwrap().into_parts();
    let names: Vec<_> = phases.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Discovery", "Build"]);

    let project = client.project("p7").await.unwrap();
    let created = client
        .create_phase(
            &project,
            &NewPhase {
                name: "Launch".into(),
                description: None,
                start_date: NaiveDate::from_ymd_opt(2026, 4, 1),
                end_date: NaiveDate::from_ymd_opt(2026, 4, 15),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name, "Launch");
    assert_eq!(created.project_id, "p7");

    client.delete_phase("ph3").await.unwrap();
}

#[tokio::test]
async fn test_phase_dates_checked_before_request() {
    let (client, _) = client().await;
    let project = client.project("p7").await.unwrap();
    let err = client
        .create_phase(
            &project,
            &NewPhase {
                name: "Backwards".into(),
                description: None,
                start_date: NaiveDate::from_ymd_opt(2026, 4, 15),
                end_date: NaiveDate::from_ymd_opt(2026, 4, 1),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref errors } if errors[0].field == "endDate"));
}

#[tokio::test]
async fn test_upload_reports_progress() {
    let (client, _) = client().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress: ProgressFn = {
        let seen = Arc::clone(&seen);
        Arc::new(move |sent, total| seen.lock().unwrap().push((sent, total)))
    };

    let data = vec![b'x'; 150 * 1024];
    let attachment = client
        .upload_attachment("t9", "report.csv", "text/csv", data, Some(progress))
        .await
        .unwrap();
    assert_eq!(attachment.file_name, "report.csv");
    assert_eq!(attachment.ticket_id, "t9");

    let seen = seen.lock().unwrap().clone();
    let total = 150 * 1024;
    assert_eq!(seen.len(), 3, "64 KiB chunks");
    assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(seen.last(), Some(&(total, total)));
}

#[tokio::test]
async fn test_empty_upload_rejected_locally() {
    let (client, _) = client().await;
    let err = client
        .upload_attachment("t9", "empty.txt", "text/plain", Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}
