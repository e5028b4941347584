//! Client-side form checks run before anything is submitted
//!
//! Each check returns every failing field so forms can show errors inline.
//! The backend validates again; these only save a round trip.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use pmboard_types::{
    Credentials, NewComment, NewPhase, NewProject, NewTeamUpdate, NewTicket, Project, TicketPatch,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_TITLE_LEN: usize = 200;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collects field errors for one form
#[derive(Debug, Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn required(&mut self, field: &str, value: &str, label: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{} is required", label)));
        }
        self
    }

    fn max_len(&mut self, field: &str, value: &str, max: usize, label: &str) -> &mut Self {
        if value.chars().count() > max {
            self.errors.push(FieldError::new(
                field,
                format!("{} must be at most {} characters", label, max),
            ));
        }
        self
    }

    fn date_order(
        &mut self,
        field: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        message: &str,
    ) -> &mut Self {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                self.errors.push(FieldError::new(field, message));
            }
        }
        self
    }

    fn finish(&mut self) -> Vec<FieldError> {
        std::mem::take(&mut self.errors)
    }
}

pub fn validate_project(project: &NewProject) -> Vec<FieldError> {
    Checker::default()
        .required("name", &project.name, "Project name")
        .max_len("name", &project.name, MAX_NAME_LEN, "Project name")
        .date_order(
            "endDate",
            project.start_date,
            project.end_date,
            "End date cannot be before start date",
        )
        .finish()
}

pub fn validate_ticket(ticket: &NewTicket) -> Vec<FieldError> {
    let mut checker = Checker::default();
    checker
        .required("title", &ticket.title, "Title")
        .max_len("title", &ticket.title, MAX_TITLE_LEN, "Title")
        .date_order(
            "dueDate",
            ticket.start_date,
            ticket.due_date,
            "Due date cannot be before start date",
        );
    if ticket.ticket_type.is_none() {
        checker
            .errors
            .push(FieldError::new("type", "Ticket type is required"));
    }
    checker.finish()
}

pub fn validate_ticket_patch(patch: &TicketPatch) -> Vec<FieldError> {
    let mut checker = Checker::default();
    if let Some(title) = &patch.title {
        checker
            .required("title", title, "Title")
            .max_len("title", title, MAX_TITLE_LEN, "Title");
    }
    checker.finish()
}

/// Start and end day of a project, when it has both
pub fn project_window(project: &Project) -> Option<(NaiveDate, NaiveDate)> {
    project
        .start_date
        .zip(project.end_date)
        .map(|(start, end)| (start.date_naive(), end.date_naive()))
}

/// Phase checks; `project_window` bounds the phase when the project has dates
pub fn validate_phase(
    phase: &NewPhase,
    project_window: Option<(NaiveDate, NaiveDate)>,
) -> Vec<FieldError> {
    let mut checker = Checker::default();
    checker
        .required("name", &phase.name, "Phase name")
        .max_len("name", &phase.name, MAX_NAME_LEN, "Phase name");
    if phase.start_date.is_none() {
        checker
            .errors
            .push(FieldError::new("startDate", "Start date is required"));
    }
    if phase.end_date.is_none() {
        checker
            .errors
            .push(FieldError::new("endDate", "End date is required"));
    }
    checker.date_order(
        "endDate",
        phase.start_date,
        phase.end_date,
        "End date cannot be before start date",
    );
    if let Some((project_start, project_end)) = project_window {
        let outside = |d: Option<NaiveDate>| d.is_some_and(|d| d < project_start || d > project_end);
        if outside(phase.start_date) || outside(phase.end_date) {
            checker.errors.push(FieldError::new(
                "startDate",
                "Phase must fall within the project timeline",
            ));
        }
    }
    checker.finish()
}

pub fn validate_comment(comment: &NewComment) -> Vec<FieldError> {
    Checker::default()
        .required("content", &comment.content, "Comment")
        .finish()
}

pub fn validate_team_update(update: &NewTeamUpdate) -> Vec<FieldError> {
    Checker::default()
        .required("projectId", &update.project_id, "Project")
        .required("content", &update.content, "Update")
        .finish()
}

pub fn validate_credentials(credentials: &Credentials) -> Vec<FieldError> {
    let mut checker = Checker::default();
    checker.required("email", &credentials.email, "Email");
    if !credentials.email.trim().is_empty() && !EMAIL_RE.is_match(credentials.email.trim()) {
        checker
            .errors
            .push(FieldError::new("email", "Enter a valid email address"));
    }
    checker.required("password", &credentials.password, "Password");
    checker.finish()
}

/// Turn a list of field errors into a `Result` for `?` at submit sites
pub fn ensure_valid(errors: Vec<FieldError>) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmboard_types::TicketType;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_project_requires_name() {
        let errors = validate_project(&NewProject::default());
        assert_eq!(errors, vec![FieldError::new("name", "Project name is required")]);
    }

    #[test]
    fn test_project_end_before_start() {
        let project = NewProject {
            name: "Apollo".into(),
            start_date: date(2026, 5, 1),
            end_date: date(2026, 4, 1),
            ..Default::default()
        };
        let errors = validate_project(&project);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endDate");
    }

    #[test]
    fn test_ticket_requires_title_and_type() {
        let errors = validate_ticket(&NewTicket::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "type"]);

        let ok = NewTicket {
            title: "Fix login".into(),
            ticket_type: Some(TicketType::Issue),
            ..Default::default()
        };
        assert!(validate_ticket(&ok).is_empty());
    }

    #[test]
    fn test_phase_outside_project_window() {
        let phase = NewPhase {
            name: "Design".into(),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 2, 1),
            ..Default::default()
        };
        let window = (date(2026, 1, 15).unwrap(), date(2026, 6, 30).unwrap());
        let errors = validate_phase(&phase, Some(window));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("project timeline"));
        assert!(validate_phase(&phase, None).is_empty());
    }

    #[test]
    fn test_project_window_needs_both_dates() {
        let mut project: Project = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Apollo",
            "startDate": "2026-01-15T09:30:00Z",
            "createdAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(project_window(&project), None);
        project.end_date = date(2026, 6, 30)
            .and_then(|d| d.and_hms_opt(23, 0, 0))
            .map(|d| d.and_utc());
        assert_eq!(
            project_window(&project),
            Some((date(2026, 1, 15).unwrap(), date(2026, 6, 30).unwrap()))
        );
    }

    #[test]
    fn test_credentials_email_shape() {
        let creds = Credentials {
            email: "not-an-email".into(),
            password: "x".into(),
        };
        assert_eq!(validate_credentials(&creds)[0].field, "email");

        let creds = Credentials {
            email: "dev@example.com".into(),
            password: String::new(),
        };
        assert_eq!(validate_credentials(&creds)[0].field, "password");
    }

    #[test]
    fn test_ensure_valid() {
        assert!(ensure_valid(Vec::new()).is_ok());
        let err = ensure_valid(vec![FieldError::new("content", "Comment is required")]);
        assert!(matches!(err, Err(CoreError::Validation { .. })));
    }
}
