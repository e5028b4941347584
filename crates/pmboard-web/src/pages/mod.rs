//! Screens

mod assignments;
mod dashboard;
mod notifications;
mod projects;
mod sign_in;
mod ticket_detail;
mod tickets;
mod updates;
mod users;

pub use assignments::Assignments;
pub use dashboard::Dashboard;
pub use notifications::Notifications;
pub use projects::Projects;
pub use sign_in::SignIn;
pub use ticket_detail::TicketDetail;
pub use tickets::Tickets;
pub use updates::Updates;
pub use users::Users;

use crate::api;
use crate::components::{use_toast, ToastContext};
use crate::session::{use_session, SessionContext};
use chrono::{DateTime, NaiveDate, Utc};
use leptos::prelude::*;
use pmboard_core::types::Role;
use pmboard_core::CoreError;

/// Turns failed requests into toasts; an expired session signs out so the
/// gate shows the sign-in prompt
#[derive(Clone, Copy)]
pub struct Reporter {
    toast: ToastContext,
    session: SessionContext,
}

impl Reporter {
    pub fn error(&self, error: &CoreError) {
        if error.requires_sign_in() {
            self.session.sign_out();
        }
        self.toast.error(error);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.toast.success(message);
    }
}

pub fn use_reporter() -> Reporter {
    Reporter {
        toast: use_toast(),
        session: use_session(),
    }
}

/// Role of the signed-in user, untracked
pub fn current_role() -> Option<Role> {
    use_session().snapshot().role()
}

/// Route prefix of the current role's screens
pub fn base_path() -> &'static str {
    current_role().map(|r| r.home_path()).unwrap_or("/")
}

pub fn fmt_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string())
}

pub fn fmt_datetime(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

/// `<input type="date">` value
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    value.parse().ok()
}

pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `(value, label)` pairs for a list of status codes
pub fn status_options(statuses: &[&str]) -> Vec<(String, String)> {
    statuses
        .iter()
        .map(|s| (s.to_string(), pmboard_core::analytics::status_label(s)))
        .collect()
}

/// Projects as select options, loaded once per screen
pub fn project_options() -> Signal<Vec<(String, String)>> {
    let projects = LocalResource::new(|| async move {
        api::fetch_projects(Default::default())
            .await
            .map(|list| list.into_parts().0)
    });

    Signal::derive(move || {
        projects
            .read().as_ref()
            .and_then(|result| result.as_ref().ok().cloned())
            .map(|projects| projects.into_iter().map(|p| (p.id, p.name)).collect())
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_helpers() {
        assert_eq!(parse_date("2026-03-04"), NaiveDate::from_ymd_opt(2026, 3, 4));
        assert_eq!(parse_date(""), None);
        assert_eq!(non_empty("  ".into()), None);
        assert_eq!(non_empty(" x ".into()), Some("x".into()));
        assert_eq!(fmt_date(None), "—");
        assert_eq!(
            status_options(&["IN_PROGRESS"]),
            vec![("IN_PROGRESS".to_string(), "In Progress".to_string())]
        );
    }
}
