//! Chart and report bucketing
//!
//! Pure functions reshaping already-fetched collections into the small
//! arrays dashboards draw: status and priority buckets, per-period
//! open/closed trends, completion percentages. `now` is always injected.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod buckets;
pub mod summary;
pub mod trends;

#[cfg(test)]
mod tests;

pub use buckets::{Bucket, UnknownPolicy, UNKNOWN_KEY, bucket_by_priority, bucket_by_status};
pub use summary::{DashboardSummary, ProjectProgress, TypeSplit, project_progress, ticket_type_split};
pub use trends::{PeriodBucket, Window, bucket_by_period};

/// Statuses that count as "closed" in trends and progress
pub const CLOSED_STATUSES: [&str; 3] = ["DONE", "RESOLVED", "CLOSED"];

/// Ticket workflow, in display order
pub const TICKET_STATUSES: [&str; 6] = ["OPEN", "IN_PROGRESS", "IN_REVIEW", "RESOLVED", "DONE", "CLOSED"];

/// Project lifecycle, in display order
pub const PROJECT_STATUSES: [&str; 5] = ["PLANNED", "ACTIVE", "ON_HOLD", "COMPLETED", "CANCELLED"];

pub const PRIORITIES: [&str; 4] = ["LOW", "MEDIUM", "HIGH", "CRITICAL"];

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]+").expect("static separator regex"));

/// Trim, upper-case and join whitespace/hyphen runs with `_`
/// (`"in progress"` and `"In-Progress"` both become `IN_PROGRESS`).
pub fn normalize_status(status: &str) -> String {
    SEPARATORS
        .replace_all(status.trim(), "_")
        .to_uppercase()
}

pub fn is_closed(status: &str) -> bool {
    let normalized = normalize_status(status);
    CLOSED_STATUSES.contains(&normalized.as_str())
}

/// `round(part / total * 100)`, or 0 when `total` is 0
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// `IN_PROGRESS` -> `In Progress`
pub fn status_label(status: &str) -> String {
    status
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
