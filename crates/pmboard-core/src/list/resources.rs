//! Per-resource list specs
//!
//! Accessors are plain `fn` items so a [`ListSpec`] stays `'static` and
//! cheap to share between controller clones.

use super::ListSpec;
use chrono::{DateTime, Utc};
use pmboard_types::{Assignment, Comment, Notification, Project, TeamUpdate, Ticket, User};

fn opt(value: &Option<String>) -> Option<&str> {
    value.as_deref()
}

// Projects

fn project_name(p: &Project) -> Option<&str> {
    Some(&p.name)
}
fn project_description(p: &Project) -> Option<&str> {
    opt(&p.description)
}
fn project_manager(p: &Project) -> Option<&str> {
    opt(&p.manager_name)
}
fn project_status(p: &Project) -> Option<&str> {
    Some(&p.status)
}
fn project_created(p: &Project) -> Option<DateTime<Utc>> {
    Some(p.created_at)
}
fn project_end(p: &Project) -> Option<DateTime<Utc>> {
    p.end_date
}

pub fn project_spec() -> ListSpec<Project> {
    ListSpec::new()
        .search(project_name)
        .search(project_description)
        .search(project_manager)
        .filter("status", project_status)
        .sort_by("createdAt", project_created)
        .sort_by("endDate", project_end)
        .columns(&["name", "status", "manager", "startDate", "endDate"])
}

// Tickets

fn ticket_title(t: &Ticket) -> Option<&str> {
    Some(&t.title)
}
fn ticket_description(t: &Ticket) -> Option<&str> {
    opt(&t.description)
}
fn ticket_project_name(t: &Ticket) -> Option<&str> {
    opt(&t.project_name)
}
fn ticket_assignee_name(t: &Ticket) -> Option<&str> {
    opt(&t.assignee_name)
}
fn ticket_status(t: &Ticket) -> Option<&str> {
    Some(&t.status)
}
fn ticket_priority(t: &Ticket) -> Option<&str> {
    opt(&t.priority)
}
fn ticket_type(t: &Ticket) -> Option<&str> {
    Some(t.ticket_type.as_str())
}
fn ticket_project(t: &Ticket) -> Option<&str> {
    opt(&t.project_id)
}
fn ticket_assignee(t: &Ticket) -> Option<&str> {
    opt(&t.assignee_id)
}
fn ticket_created(t: &Ticket) -> Option<DateTime<Utc>> {
    Some(t.created_at)
}
fn ticket_due(t: &Ticket) -> Option<DateTime<Utc>> {
    t.due_date
}

/// Tickets are the one server-paginated resource
pub fn ticket_spec() -> ListSpec<Ticket> {
    ListSpec::new()
        .search(ticket_title)
        .search(ticket_description)
        .search(ticket_project_name)
        .search(ticket_assignee_name)
        .filter("status", ticket_status)
        .filter("priority", ticket_priority)
        .filter("type", ticket_type)
        .filter("projectId", ticket_project)
        .filter("assigneeId", ticket_assignee)
        .sort_by("createdAt", ticket_created)
        .sort_by("dueDate", ticket_due)
        .columns(&["title", "type", "status", "priority", "project", "assignee", "dueDate"])
        .server_paginated()
}

// Users

fn user_name(u: &User) -> Option<&str> {
    Some(&u.name)
}
fn user_email(u: &User) -> Option<&str> {
    Some(&u.email)
}
fn user_role(u: &User) -> Option<&str> {
    Some(&u.role)
}
fn user_created(u: &User) -> Option<DateTime<Utc>> {
    u.created_at
}

pub fn user_spec() -> ListSpec<User> {
    ListSpec::new()
        .search(user_name)
        .search(user_email)
        .filter("role", user_role)
        .sort_by("createdAt", user_created)
        .columns(&["name", "email", "role", "active"])
}

// Notifications

fn notification_title(n: &Notification) -> Option<&str> {
    Some(&n.title)
}
fn notification_message(n: &Notification) -> Option<&str> {
    Some(&n.message)
}
fn notification_state(n: &Notification) -> Option<&str> {
    Some(if n.read { "read" } else { "unread" })
}
fn notification_created(n: &Notification) -> Option<DateTime<Utc>> {
    Some(n.created_at)
}

/// `state` filter takes `read` or `unread`
pub fn notification_spec() -> ListSpec<Notification> {
    ListSpec::new()
        .search(notification_title)
        .search(notification_message)
        .filter("state", notification_state)
        .sort_by("createdAt", notification_created)
        .columns(&["title", "message", "createdAt"])
}

// Team updates

fn update_content(u: &TeamUpdate) -> Option<&str> {
    Some(&u.content)
}
fn update_author(u: &TeamUpdate) -> Option<&str> {
    opt(&u.author_name)
}
fn update_project_name(u: &TeamUpdate) -> Option<&str> {
    opt(&u.project_name)
}
fn update_project(u: &TeamUpdate) -> Option<&str> {
    Some(&u.project_id)
}
fn update_kind(u: &TeamUpdate) -> Option<&str> {
    Some(match u.kind {
        pmboard_types::UpdateKind::Daily => "DAILY",
        pmboard_types::UpdateKind::Project => "PROJECT",
    })
}
fn update_created(u: &TeamUpdate) -> Option<DateTime<Utc>> {
    Some(u.created_at)
}

pub fn team_update_spec() -> ListSpec<TeamUpdate> {
    ListSpec::new()
        .search(update_content)
        .search(update_author)
        .search(update_project_name)
        .filter("projectId", update_project)
        .filter("type", update_kind)
        .sort_by("createdAt", update_created)
        .columns(&["author", "project", "content", "blockers", "createdAt"])
}

// Assignments

fn assignment_user(a: &Assignment) -> Option<&str> {
    opt(&a.user_name)
}
fn assignment_role(a: &Assignment) -> Option<&str> {
    opt(&a.project_role)
}
fn assignment_project(a: &Assignment) -> Option<&str> {
    Some(&a.project_id)
}
fn assignment_at(a: &Assignment) -> Option<DateTime<Utc>> {
    Some(a.assigned_at)
}

pub fn assignment_spec() -> ListSpec<Assignment> {
    ListSpec::new()
        .search(assignment_user)
        .search(assignment_role)
        .filter("projectId", assignment_project)
        .sort_by("assignedAt", assignment_at)
        .columns(&["user", "project", "role", "assignedAt"])
}

// Comments

fn comment_content(c: &Comment) -> Option<&str> {
    Some(&c.content)
}
fn comment_author(c: &Comment) -> Option<&str> {
    opt(&c.author_name)
}
fn comment_created(c: &Comment) -> Option<DateTime<Utc>> {
    Some(c.created_at)
}

/// Oldest first, like a conversation
pub fn comment_spec() -> ListSpec<Comment> {
    ListSpec::new()
        .search(comment_content)
        .search(comment_author)
        .sort_by("createdAt", comment_created)
        .ascending()
        .columns(&["author", "content", "createdAt"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{filter_and_sort, ListQuery, PaginationMode};
    use chrono::TimeZone;
    use pmboard_types::TicketType;

    fn project(name: &str, status: &str, day: u32) -> Project {
        Project {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: None,
            status: status.to_string(),
            start_date: None,
            end_date: None,
            manager_id: None,
            manager_name: Some("Dana".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 2, day, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_project_search_and_status_filter() {
        let items = vec![
            project("Alpha", "ACTIVE", 1),
            project("Beta", "ACTIVE", 2),
            project("Alphabet", "DONE", 3),
        ];
        let mut query = ListQuery::for_spec(&project_spec(), 10);
        query.search = "alp".into();
        query.filters.insert("status".into(), "ACTIVE".into());

        let out = filter_and_sort(&items, &query, &project_spec());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Alpha");
    }

    #[test]
    fn test_project_search_matches_manager() {
        let items = vec![project("Apollo", "ACTIVE", 1)];
        let mut query = ListQuery::new(10);
        query.search = "dana".into();
        assert_eq!(filter_and_sort(&items, &query, &project_spec()).len(), 1);
    }

    #[test]
    fn test_ticket_spec_is_server_paginated() {
        let spec = ticket_spec();
        assert_eq!(spec.mode(), PaginationMode::Server);
        assert!(spec.filter_names().any(|f| f == "type"));
        assert_eq!(project_spec().mode(), PaginationMode::Client);
    }

    #[test]
    fn test_ticket_type_filter_uses_wire_value() {
        let ticket = Ticket {
            id: "t1".into(),
            title: "Crash".into(),
            description: None,
            ticket_type: TicketType::Issue,
            status: "OPEN".into(),
            priority: Some("HIGH".into()),
            project_id: None,
            project_name: None,
            assignee_id: None,
            assignee_name: None,
            reporter_id: None,
            start_date: None,
            due_date: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        };
        assert_eq!(ticket_type(&ticket), Some("ISSUE"));
    }

    #[test]
    fn test_notification_state_filter() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let items = vec![
            Notification { id: "1".into(), title: "a".into(), message: String::new(), read: true, link: None, created_at: at },
            Notification { id: "2".into(), title: "b".into(), message: String::new(), read: false, link: None, created_at: at },
        ];
        let mut query = ListQuery::new(10);
        query.filters.insert("state".into(), "unread".into());
        let out = filter_and_sort(&items, &query, &notification_spec());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2");
    }
}
