//! Unit tests for analytics module

use super::*;
use chrono::{DateTime, TimeZone, Utc};
use pmboard_types::{Project, Ticket, TicketType};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn ticket(id: &str, status: &str, priority: Option<&str>, project: Option<&str>, created: DateTime<Utc>) -> Ticket {
    Ticket {
        id: id.to_string(),
        title: format!("Ticket {}", id),
        description: None,
        ticket_type: if id.starts_with('i') { TicketType::Issue } else { TicketType::Task },
        status: status.to_string(),
        priority: priority.map(str::to_string),
        project_id: project.map(str::to_string),
        project_name: None,
        assignee_id: None,
        assignee_name: None,
        reporter_id: None,
        start_date: None,
        due_date: None,
        created_at: created,
        updated_at: None,
    }
}

fn project(id: &str, status: &str) -> Project {
    Project {
        id: id.to_string(),
        name: id.to_uppercase(),
        description: None,
        status: status.to_string(),
        start_date: None,
        end_date: None,
        manager_id: None,
        manager_name: None,
        created_at: at(2026, 1, 1),
        updated_at: None,
    }
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_normalize_status() {
    assert_eq!(normalize_status("in progress"), "IN_PROGRESS");
    assert_eq!(normalize_status(" In-Progress "), "IN_PROGRESS");
    assert_eq!(normalize_status("on -  hold"), "ON_HOLD");
    assert_eq!(normalize_status("DONE"), "DONE");
}

#[test]
fn test_status_label() {
    assert_eq!(status_label("IN_PROGRESS"), "In Progress");
    assert_eq!(status_label("DONE"), "Done");
}

#[test]
fn test_is_closed() {
    assert!(is_closed("done"));
    assert!(is_closed("Resolved"));
    assert!(is_closed("CLOSED"));
    assert!(!is_closed("IN_REVIEW"));
}

// ============================================================================
// Percent
// ============================================================================

#[test]
fn test_percent_boundaries() {
    assert_eq!(percent(5, 0), 0);
    assert_eq!(percent(0, 7), 0);
    assert_eq!(percent(7, 7), 100);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(2, 3), 67);
    assert_eq!(percent(1, 8), 13, "12.5 rounds up");
}

// ============================================================================
// Status buckets
// ============================================================================

#[test]
fn test_bucket_by_status_with_unknown() {
    let statuses = ["open", "In Progress", "done", "weird", ""];
    let buckets = bucket_by_status(&statuses, |s| Some(*s), &TICKET_STATUSES, UnknownPolicy::Bucket);

    assert_eq!(buckets.len(), TICKET_STATUSES.len() + 1);
    assert_eq!(buckets[0].key, "OPEN");
    assert_eq!(buckets[0].count, 1);
    assert_eq!(buckets[1].count, 1);
    let unknown = buckets.last().unwrap();
    assert_eq!(unknown.key, UNKNOWN_KEY);
    assert_eq!(unknown.count, 2);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), statuses.len());
}

#[test]
fn test_bucket_by_status_drop_policy() {
    let statuses = ["ACTIVE", "nonsense"];
    let buckets = bucket_by_status(&statuses, |s| Some(*s), &PROJECT_STATUSES, UnknownPolicy::Drop);
    assert_eq!(buckets.len(), PROJECT_STATUSES.len());
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 1);
}

#[test]
fn test_bucket_by_priority_counts_missing_as_unknown() {
    let priorities = [Some("high"), None, Some("LOW"), Some("urgent")];
    let buckets = bucket_by_priority(&priorities, |p| *p);
    let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 0, 1, 0, 2]);
}

// ============================================================================
// Period buckets
// ============================================================================

#[test]
fn test_months_window_keys_oldest_first() {
    let now = at(2026, 2, 15);
    let buckets = bucket_by_period::<Ticket, _, _>(&[], |t| Some(t.created_at), |t| Some(t.status.as_str()), Window::Months(6), now);
    let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["2025-09", "2025-10", "2025-11", "2025-12", "2026-01", "2026-02"]);
    assert_eq!(buckets[0].label, "Sep");
    assert_eq!(buckets[5].label, "Feb");
}

#[test]
fn test_months_window_splits_open_closed_and_drops_outside() {
    let now = at(2026, 2, 15);
    let tickets = vec![
        ticket("t1", "OPEN", None, None, at(2026, 2, 1)),
        ticket("t2", "done", None, None, at(2026, 2, 3)),
        ticket("t3", "RESOLVED", None, None, at(2025, 12, 31)),
        ticket("t4", "OPEN", None, None, at(2025, 8, 31)),
        ticket("t5", "OPEN", None, None, at(2026, 3, 1)),
    ];
    let buckets = bucket_by_period(&tickets, |t| Some(t.created_at), |t| Some(t.status.as_str()), Window::half_year(), now);

    let feb = buckets.last().unwrap();
    assert_eq!((feb.open, feb.closed), (1, 1));
    let dec = buckets.iter().find(|b| b.key == "2025-12").unwrap();
    assert_eq!(dec.closed, 1);
    assert_eq!(buckets.iter().map(PeriodBucket::total).sum::<usize>(), 3);
}

#[test]
fn test_days_window() {
    // 2026-03-04 is a Wednesday
    let now = at(2026, 3, 4);
    let tickets = vec![
        ticket("t1", "OPEN", None, None, at(2026, 3, 4)),
        ticket("t2", "CLOSED", None, None, at(2026, 2, 26)),
        ticket("t3", "OPEN", None, None, at(2026, 2, 25)),
    ];
    let buckets = bucket_by_period(&tickets, |t| Some(t.created_at), |t| Some(t.status.as_str()), Window::last_week(), now);

    assert_eq!(buckets.len(), 7);
    assert_eq!(buckets[0].key, "2026-02-26");
    assert_eq!(buckets[0].label, "Thu");
    assert_eq!(buckets[6].label, "Wed");
    assert_eq!(buckets[0].closed, 1);
    assert_eq!(buckets[6].open, 1);
}

#[test]
fn test_months_window_across_year_boundary() {
    let buckets = bucket_by_period::<Ticket, _, _>(&[], |t| Some(t.created_at), |_| None, Window::Months(3), at(2026, 1, 10));
    let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["2025-11", "2025-12", "2026-01"]);
}

// ============================================================================
// Summaries
// ============================================================================

#[test]
fn test_project_progress() {
    let projects = vec![project("p1", "ACTIVE"), project("p2", "PLANNED")];
    let now = at(2026, 1, 5);
    let tickets = vec![
        ticket("t1", "DONE", None, Some("p1"), now),
        ticket("t2", "OPEN", None, Some("p1"), now),
        ticket("t3", "CLOSED", None, Some("p1"), now),
        ticket("t4", "OPEN", None, Some("other"), now),
        ticket("t5", "OPEN", None, None, now),
    ];
    let progress = project_progress(&projects, &tickets);
    assert_eq!(progress[0].total, 3);
    assert_eq!(progress[0].closed, 2);
    assert_eq!(progress[0].percent, 67);
    assert_eq!(progress[1].total, 0);
    assert_eq!(progress[1].percent, 0);
}

#[test]
fn test_ticket_type_split() {
    let now = at(2026, 1, 5);
    let tickets = vec![
        ticket("i1", "OPEN", None, None, now),
        ticket("t1", "OPEN", None, None, now),
        ticket("t2", "OPEN", None, None, now),
        ticket("t3", "OPEN", None, None, now),
    ];
    let split = ticket_type_split(&tickets);
    assert_eq!((split.issues, split.tasks), (1, 3));
    assert_eq!((split.issue_percent, split.task_percent), (25, 75));
    assert_eq!(ticket_type_split(&[]), TypeSplit::default());
}

#[test]
fn test_dashboard_summary() {
    let now = at(2026, 4, 20);
    let projects = vec![project("p1", "active"), project("p2", "COMPLETED")];
    let tickets = vec![
        ticket("i1", "OPEN", Some("HIGH"), Some("p1"), at(2026, 4, 1)),
        ticket("t1", "RESOLVED", Some("LOW"), Some("p1"), at(2026, 3, 2)),
        ticket("t2", "blocked", None, Some("p2"), at(2026, 2, 2)),
    ];
    let summary = DashboardSummary::compute(&projects, &tickets, Window::half_year(), now);

    assert_eq!(summary.total_projects, 2);
    assert_eq!(summary.total_tickets, 3);
    assert_eq!(summary.closed_tickets, 1);
    assert_eq!(summary.open_tickets, 2);
    assert_eq!(summary.completion_percent, 33);
    assert_eq!(summary.ticket_status.iter().map(|b| b.count).sum::<usize>(), 3);
    assert_eq!(summary.project_status.iter().map(|b| b.count).sum::<usize>(), 2);
    assert_eq!(summary.trend.len(), 6);
    assert_eq!(summary.progress.len(), 2);
    assert_eq!(summary.type_split.issues, 1);
}
