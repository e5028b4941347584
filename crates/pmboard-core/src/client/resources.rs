//! Endpoint methods per resource

use super::{ApiClient, DashboardData};
use crate::error::CoreError;
use crate::list::{COLLECT_PAGE_SIZE, FetchParams, collect_pages};
use crate::validation::{
    FieldError, ensure_valid, project_window, validate_comment, validate_credentials, validate_phase, validate_project,
    validate_team_update, validate_ticket, validate_ticket_patch,
};
use pmboard_types::{
    Assignment, Attachment, Comment, Credentials, ListResponse, NewAssignment, NewComment, NewPhase,
    NewProject, NewTeamUpdate, NewTicket, Notification, Project, ProjectPatch, ProjectPhase, Session,
    SignInResponse, TeamUpdate, Ticket, TicketPatch, User,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use tracing::info;

/// Upload progress callback: `(bytes_sent, total_bytes)`
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

const UPLOAD_CHUNK: usize = 64 * 1024;

impl ApiClient {
    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Sign in and persist the returned token and role
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, CoreError> {
        ensure_valid(validate_credentials(credentials))?;
        let response: SignInResponse = self
            .create("/auth/login", credentials)
            .await
            .map_err(CoreError::into_sign_in_failure)?;
        let session = Session::from_raw(Some(response.token), Some(response.role));
        self.session().set(session.clone())?;
        self.clear_cache();
        info!(role = session.raw_role().unwrap_or("-"), "Signed in");
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.session().clear()?;
        self.clear_cache();
        info!("Signed out");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub async fn projects(&self, params: &FetchParams) -> Result<ListResponse<Project>, CoreError> {
        self.list("/projects", params).await
    }

    /// Projects for select inputs
    pub async fn project_options(&self) -> Result<Vec<Project>, CoreError> {
        self.options("/projects").await
    }

    pub async fn project(&self, id: &str) -> Result<Project, CoreError> {
        self.detail(&format!("/projects/{}", id)).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, CoreError> {
        ensure_valid(validate_project(project))?;
        self.create("/projects", project).await
    }

    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project, CoreError> {
        if let (Some(start), Some(end)) = (patch.start_date, patch.end_date) {
            if end < start {
                return Err(CoreError::Validation {
                    errors: vec![FieldError::new("endDate", "End date must be on or after the start date")],
                });
            }
        }
        self.update(&format!("/projects/{}", id), patch).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/projects/{}", id)).await
    }

    // ------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------

    pub async fn phases(&self, project_id: &str) -> Result<ListResponse<ProjectPhase>, CoreError> {
        self.list(&format!("/projects/{}/phases", project_id), &FetchParams::default())
            .await
    }

    /// Create a phase; dates are checked against the project window when
    /// the project has one
    pub async fn create_phase(&self, project: &Project, phase: &NewPhase) -> Result<ProjectPhase, CoreError> {
        ensure_valid(validate_phase(phase, project_window(project)))?;
        self.create(&format!("/projects/{}/phases", project.id), phase).await
    }

    pub async fn delete_phase(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/phases/{}", id)).await?;
        // Phase lists hang off their project
        self.invalidate("/projects").await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    pub async fn tickets(&self, params: &FetchParams) -> Result<ListResponse<Ticket>, CoreError> {
        self.list("/tickets", params).await
    }

    pub async fn ticket(&self, id: &str) -> Result<Ticket, CoreError> {
        self.detail(&format!("/tickets/{}", id)).await
    }

    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, CoreError> {
        ensure_valid(validate_ticket(ticket))?;
        self.create("/tickets", ticket).await
    }

    pub async fn update_ticket(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, CoreError> {
        ensure_valid(validate_ticket_patch(patch))?;
        self.patch(&format!("/tickets/{}", id), patch).await
    }

    pub async fn delete_ticket(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/tickets/{}", id)).await
    }

    /// Every ticket matching `params`, walking all pages
    pub async fn all_tickets(&self, params: &FetchParams) -> Result<Vec<Ticket>, CoreError> {
        collect_pages(params.clone(), COLLECT_PAGE_SIZE, |page| async move {
            self.tickets(&page).await
        })
        .await
    }

    pub async fn all_projects(&self) -> Result<Vec<Project>, CoreError> {
        collect_pages(FetchParams::default(), COLLECT_PAGE_SIZE, |page| async move {
            self.projects(&page).await
        })
        .await
    }

    /// All projects and tickets for the dashboard charts, cached for the
    /// configured dashboard stale time
    pub async fn dashboard_data(&self) -> Result<Arc<DashboardData>, CoreError> {
        self.dashboard_cache()
            .get_or_fetch("dashboard", async {
                let projects = self.all_projects().await?;
                let tickets = self.all_tickets(&FetchParams::default()).await?;
                Ok(Arc::new(DashboardData { projects, tickets }))
            })
            .await
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn comments(&self, ticket_id: &str) -> Result<ListResponse<Comment>, CoreError> {
        self.list(&format!("/tickets/{}/comments", ticket_id), &FetchParams::default())
            .await
    }

    pub async fn add_comment(&self, ticket_id: &str, comment: &NewComment) -> Result<Comment, CoreError> {
        ensure_valid(validate_comment(comment))?;
        self.create(&format!("/tickets/{}/comments", ticket_id), comment).await
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/comments/{}", id)).await?;
        self.invalidate("/tickets").await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------

    pub async fn attachments(&self, ticket_id: &str) -> Result<ListResponse<Attachment>, CoreError> {
        self.list(&format!("/tickets/{}/attachments", ticket_id), &FetchParams::default())
            .await
    }

    /// Multipart upload (`file` field) streamed in chunks; `progress` is
    /// called after every chunk handed to the transport
    pub async fn upload_attachment(
        &self,
        ticket_id: &str,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
        progress: Option<ProgressFn>,
    ) -> Result<Attachment, CoreError> {
        if data.is_empty() {
            return Err(CoreError::Validation {
                errors: vec![FieldError::new("file", "File is empty")],
            });
        }

        let total = data.len() as u64;
        let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK).map(<[u8]>::to_vec).collect();
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(progress) = &progress {
                progress(sent, total);
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|_| CoreError::Validation {
                errors: vec![FieldError::new("file", format!("Unsupported file type '{}'", mime_type))],
            })?;
        let form = Form::new().part("file", part);

        let path = format!("/tickets/{}/attachments", ticket_id);
        let response = self
            .send(&path, self.request(Method::POST, &path).multipart(form))
            .await?;
        let attachment = super::decode::<pmboard_types::Detail<Attachment>>(&path, response)
            .await?
            .into_inner();
        self.invalidate(&path).await;
        Ok(attachment)
    }

    pub async fn download_attachment(&self, id: &str) -> Result<Vec<u8>, CoreError> {
        self.download(&format!("/attachments/{}/download", id)).await
    }

    pub async fn delete_attachment(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/attachments/{}", id)).await?;
        self.invalidate("/tickets").await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------

    pub async fn assignments(&self, params: &FetchParams) -> Result<ListResponse<Assignment>, CoreError> {
        self.list("/assignments", params).await
    }

    pub async fn create_assignment(&self, assignment: &NewAssignment) -> Result<Assignment, CoreError> {
        let mut errors = Vec::new();
        if assignment.project_id.trim().is_empty() {
            errors.push(FieldError::new("projectId", "Project is required"));
        }
        if assignment.user_id.trim().is_empty() {
            errors.push(FieldError::new("userId", "User is required"));
        }
        ensure_valid(errors)?;
        self.create("/assignments", assignment).await
    }

    pub async fn delete_assignment(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/assignments/{}", id)).await
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub async fn notifications(&self, params: &FetchParams) -> Result<ListResponse<Notification>, CoreError> {
        self.list("/notifications", params).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), CoreError> {
        self.send_empty(Method::PATCH, &format!("/notifications/{}/read", id))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), CoreError> {
        self.send_empty(Method::PATCH, "/notifications/read-all").await
    }

    // ------------------------------------------------------------------
    // Team updates
    // ------------------------------------------------------------------

    pub async fn team_updates(&self, params: &FetchParams) -> Result<ListResponse<TeamUpdate>, CoreError> {
        self.list("/updates", params).await
    }

    pub async fn create_team_update(&self, update: &NewTeamUpdate) -> Result<TeamUpdate, CoreError> {
        ensure_valid(validate_team_update(update))?;
        self.create("/updates", update).await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn users(&self, params: &FetchParams) -> Result<ListResponse<User>, CoreError> {
        self.list("/users", params).await
    }

    /// Users for select inputs
    pub async fn user_options(&self) -> Result<Vec<User>, CoreError> {
        self.options("/users").await
    }
}
