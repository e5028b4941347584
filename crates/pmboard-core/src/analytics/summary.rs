//! Dashboard summaries built from the bucketing helpers

use super::buckets::{Bucket, UnknownPolicy, bucket_by_priority, bucket_by_status};
use super::trends::{PeriodBucket, Window, bucket_by_period};
use super::{PROJECT_STATUSES, TICKET_STATUSES, is_closed, percent};
use chrono::{DateTime, Utc};
use pmboard_types::{Project, Ticket, TicketType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed-ticket completion for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub project_id: String,
    pub name: String,
    pub total: usize,
    pub closed: usize,
    pub percent: u32,
}

/// Completion per project, in the order of `projects`. Tickets without a
/// project, or for a project not in the list, are ignored.
pub fn project_progress(projects: &[Project], tickets: &[Ticket]) -> Vec<ProjectProgress> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for ticket in tickets {
        if let Some(project_id) = ticket.project_id.as_deref() {
            let entry = counts.entry(project_id).or_default();
            entry.0 += 1;
            if is_closed(&ticket.status) {
                entry.1 += 1;
            }
        }
    }

    projects
        .iter()
        .map(|project| {
            let (total, closed) = counts.get(project.id.as_str()).copied().unwrap_or_default();
            ProjectProgress {
                project_id: project.id.clone(),
                name: project.name.clone(),
                total,
                closed,
                percent: percent(closed, total),
            }
        })
        .collect()
}

/// Issue vs task split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeSplit {
    pub issues: usize,
    pub tasks: usize,
    pub issue_percent: u32,
    pub task_percent: u32,
}

pub fn ticket_type_split(tickets: &[Ticket]) -> TypeSplit {
    let issues = tickets
        .iter()
        .filter(|t| t.ticket_type == TicketType::Issue)
        .count();
    let tasks = tickets.len() - issues;
    TypeSplit {
        issues,
        tasks,
        issue_percent: percent(issues, tickets.len()),
        task_percent: percent(tasks, tickets.len()),
    }
}

/// Everything a role dashboard draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub closed_tickets: usize,
    /// Closed tickets as a percentage of all tickets
    pub completion_percent: u32,
    pub ticket_status: Vec<Bucket>,
    pub project_status: Vec<Bucket>,
    pub priority: Vec<Bucket>,
    pub trend: Vec<PeriodBucket>,
    pub progress: Vec<ProjectProgress>,
    pub type_split: TypeSplit,
}

impl DashboardSummary {
    pub fn compute(projects: &[Project], tickets: &[Ticket], window: Window, now: DateTime<Utc>) -> Self {
        let closed_tickets = tickets.iter().filter(|t| is_closed(&t.status)).count();

        Self {
            total_projects: projects.len(),
            total_tickets: tickets.len(),
            open_tickets: tickets.len() - closed_tickets,
            closed_tickets,
            completion_percent: percent(closed_tickets, tickets.len()),
            ticket_status: bucket_by_status(
                tickets,
                |t| Some(t.status.as_str()),
                &TICKET_STATUSES,
                UnknownPolicy::Bucket,
            ),
            project_status: bucket_by_status(
                projects,
                |p| Some(p.status.as_str()),
                &PROJECT_STATUSES,
                UnknownPolicy::Drop,
            ),
            priority: bucket_by_priority(tickets, |t| t.priority.as_deref()),
            trend: bucket_by_period(
                tickets,
                |t| Some(t.created_at),
                |t| Some(t.status.as_str()),
                window,
                now,
            ),
            progress: project_progress(projects, tickets),
            type_split: ticket_type_split(tickets),
        }
    }
}
