//! Output formatting for the CLI commands

use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use pmboard_core::access::{GateDecision, PublicDecision};
use pmboard_core::analytics::{status_label, Bucket, DashboardSummary};
use pmboard_core::types::{
    Assignment, Attachment, Comment, Notification, PaginationMeta, Project, ProjectPhase, Session, TeamUpdate,
    Ticket, UpdateKind, User,
};
use serde::Serialize;

/// Table or JSON, from `--format`/`--json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Table { color: bool },
    Json,
}

impl Output {
    pub fn is_json(self) -> bool {
        self == Output::Json
    }
}

fn table(output: Output, headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    match output {
        Output::Table { color: true } => {
            table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect::<Vec<_>>());
        }
        _ => {
            table.set_header(headers.to_vec());
        }
    }
    table
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Page footer under a list table
fn footer(meta: &PaginationMeta) -> String {
    format!(
        "Page {} of {} ({} total)",
        meta.page,
        meta.total_pages.max(1),
        meta.total
    )
}

pub fn format_projects(projects: &[Project], meta: &PaginationMeta, output: Output) -> String {
    if output.is_json() {
        return json(&serde_json::json!({ "data": projects, "pagination": meta }));
    }
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let mut t = table(output, &["ID", "Name", "Status", "Manager", "Start", "End"]);
    for p in projects {
        t.add_row(Row::from(vec![
            truncate(&p.id, 12),
            truncate(&p.name, 40),
            status_label(&p.status),
            p.manager_name.clone().unwrap_or_else(|| "-".to_string()),
            date(p.start_date),
            date(p.end_date),
        ]));
    }
    format!("{}\n{}", t, footer(meta))
}

pub fn format_tickets(tickets: &[Ticket], meta: &PaginationMeta, output: Output) -> String {
    if output.is_json() {
        return json(&serde_json::json!({ "data": tickets, "pagination": meta }));
    }
    if tickets.is_empty() {
        return "No tickets found.".to_string();
    }

    let mut t = table(output, &["ID", "Title", "Type", "Status", "Priority", "Assignee", "Due"]);
    for ticket in tickets {
        t.add_row(Row::from(vec![
            truncate(&ticket.id, 12),
            truncate(&ticket.title, 40),
            ticket.ticket_type.as_str().to_string(),
            status_label(&ticket.status),
            ticket.priority.as_deref().map(status_label).unwrap_or_else(|| "-".to_string()),
            ticket.assignee_name.clone().unwrap_or_else(|| "-".to_string()),
            date(ticket.due_date),
        ]));
    }
    format!("{}\n{}", t, footer(meta))
}

pub fn format_users(users: &[User], meta: &PaginationMeta, output: Output) -> String {
    if output.is_json() {
        return json(&serde_json::json!({ "data": users, "pagination": meta }));
    }
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let mut t = table(output, &["ID", "Name", "Email", "Role", "Active"]);
    for u in users {
        t.add_row(Row::from(vec![
            truncate(&u.id, 12),
            u.name.clone(),
            u.email.clone(),
            u.role.clone(),
            if u.active { "yes" } else { "no" }.to_string(),
        ]));
    }
    format!("{}\n{}", t, footer(meta))
}

pub fn format_notifications(notifications: &[Notification], meta: &PaginationMeta, output: Output) -> String {
    if output.is_json() {
        return json(&serde_json::json!({ "data": notifications, "pagination": meta }));
    }
    if notifications.is_empty() {
        return "No notifications.".to_string();
    }

    let mut t = table(output, &["ID", "", "Title", "Message", "Received"]);
    for n in notifications {
        t.add_row(Row::from(vec![
            truncate(&n.id, 12),
            if n.read { " " } else { "●" }.to_string(),
            truncate(&n.title, 30),
            truncate(&n.message, 50),
            n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]));
    }
    format!("{}\n{}", t, footer(meta))
}

pub fn format_updates(updates: &[TeamUpdate], meta: &PaginationMeta, output: Output) -> String {
    if output.is_json() {
        return json(&serde_json::json!({ "data": updates, "pagination": meta }));
    }
    if updates.is_empty() {
        return "No updates.".to_string();
    }

    let mut t = table(output, &["Date", "Kind", "Author", "Project", "Update", "Blockers"]);
    for u in updates {
        t.add_row(Row::from(vec![
            u.report_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| u.created_at.format("%Y-%m-%d").to_string()),
            match u.kind {
                UpdateKind::Daily => "daily",
                UpdateKind::Project => "project",
            }
            .to_string(),
            u.author_name.clone().unwrap_or_else(|| u.author_id.clone()),
            u.project_name.clone().unwrap_or_else(|| u.project_id.clone()),
            truncate(&u.content, 50),
            u.blockers.as_deref().map(|b| truncate(b, 30)).unwrap_or_default(),
        ]));
    }
    format!("{}\n{}", t, footer(meta))
}

pub fn format_phases(phases: &[ProjectPhase], output: Output) -> String {
    if output.is_json() {
        return json(phases);
    }
    if phases.is_empty() {
        return "No phases yet.".to_string();
    }

    let mut t = table(output, &["ID", "Phase", "Status", "Start", "End"]);
    for phase in phases {
        t.add_row(Row::from(vec![
            truncate(&phase.id, 12),
            truncate(&phase.name, 40),
            phase.status.as_deref().map(status_label).unwrap_or_else(|| "-".to_string()),
            date(Some(phase.start_date)),
            date(Some(phase.end_date)),
        ]));
    }
    t.to_string()
}

pub fn format_comments(comments: &[Comment], output: Output) -> String {
    if output.is_json() {
        return json(comments);
    }
    if comments.is_empty() {
        return "No comments yet.".to_string();
    }

    comments
        .iter()
        .map(|c| {
            format!(
                "{} · {}\n  {}",
                c.author_name.as_deref().unwrap_or(&c.author_id),
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_assignments(
    assignments: &[Assignment],
    project_names: &std::collections::HashMap<String, String>,
    meta: &PaginationMeta,
    output: Output,
) -> String {
    if output.is_json() {
        return json(&serde_json::json!({ "data": assignments, "pagination": meta }));
    }
    if assignments.is_empty() {
        return "No assignments found.".to_string();
    }

    let mut t = table(output, &["ID", "Project", "Member", "Project role", "Assigned"]);
    for a in assignments {
        t.add_row(Row::from(vec![
            truncate(&a.id, 12),
            project_names.get(&a.project_id).cloned().unwrap_or_else(|| a.project_id.clone()),
            a.user_name.clone().unwrap_or_else(|| a.user_id.clone()),
            a.project_role.clone().unwrap_or_else(|| "-".to_string()),
            date(Some(a.assigned_at)),
        ]));
    }
    format!("{}\n{}", t, footer(meta))
}

pub fn format_attachment(attachment: &Attachment, output: Output) -> String {
    if output.is_json() {
        return json(attachment);
    }
    format!(
        "Uploaded {} ({}) as {}",
        attachment.file_name,
        format_size(attachment.size_bytes),
        attachment.id
    )
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.1} MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_session(session: &Session, output: Output) -> String {
    if output.is_json() {
        return json(&serde_json::json!({
            "authenticated": session.is_authenticated(),
            "role": session.raw_role(),
            "home": session.role().map(|r| r.home_path()),
        }));
    }
    if !session.is_authenticated() {
        return "Not signed in. Run `pmboard login`.".to_string();
    }
    match session.role() {
        Some(role) => format!("Signed in as {} (home: {})", role.label(), role.home_path()),
        None => format!(
            "Signed in with unknown role '{}'; every screen will be forbidden",
            session.raw_role().unwrap_or_default()
        ),
    }
}

/// Gate outcome for `pmboard gate <path>`
pub fn format_gate(path: &str, decision: Option<GateDecision>, public: PublicDecision) -> String {
    match decision {
        Some(GateDecision::Render) => format!("{}: render", path),
        Some(GateDecision::Unauthorized) => format!("{}: unauthorized (sign in required)", path),
        Some(GateDecision::Forbidden) => format!("{}: forbidden for this role", path),
        None => match public {
            PublicDecision::Redirect(home) => format!("{}: public screen, redirects to {}", path, home),
            PublicDecision::Render => format!("{}: public screen, render", path),
        },
    }
}

fn bucket_table(output: Output, title: &str, buckets: &[Bucket]) -> String {
    let total: usize = buckets.iter().map(|b| b.count).sum();
    let mut t = table(output, &[title, "Count", "%"]);
    for b in buckets {
        t.add_row(Row::from(vec![
            status_label(&b.label),
            b.count.to_string(),
            format!("{}%", pmboard_core::analytics::percent(b.count, total)),
        ]));
    }
    t.to_string()
}

pub fn format_summary(summary: &DashboardSummary, output: Output) -> String {
    if output.is_json() {
        return json(summary);
    }

    let mut sections = vec![format!(
        "Projects: {}   Tickets: {} ({} open, {} closed)   Completion: {}%",
        summary.total_projects,
        summary.total_tickets,
        summary.open_tickets,
        summary.closed_tickets,
        summary.completion_percent
    )];
    sections.push(format!(
        "Issues: {} ({}%)   Tasks: {} ({}%)",
        summary.type_split.issues,
        summary.type_split.issue_percent,
        summary.type_split.tasks,
        summary.type_split.task_percent
    ));
    sections.push(bucket_table(output, "Ticket status", &summary.ticket_status));
    sections.push(bucket_table(output, "Priority", &summary.priority));
    sections.push(bucket_table(output, "Project status", &summary.project_status));

    let mut trend = table(output, &["Period", "Open", "Closed", "Total"]);
    for p in &summary.trend {
        trend.add_row(Row::from(vec![
            p.key.clone(),
            p.open.to_string(),
            p.closed.to_string(),
            p.total().to_string(),
        ]));
    }
    sections.push(trend.to_string());

    if !summary.progress.is_empty() {
        let mut progress = table(output, &["Project", "Closed", "Total", "Progress"]);
        for p in &summary.progress {
            progress.add_row(Row::from(vec![
                truncate(&p.name, 40),
                p.closed.to_string(),
                p.total.to_string(),
                format!("{}%", p.percent),
            ]));
        }
        sections.push(progress.to_string());
    }

    sections.join("\n\n")
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate on a char boundary, adding an ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
