//! Status and priority buckets

use super::{PRIORITIES, normalize_status, status_label};
use serde::{Deserialize, Serialize};

/// Key of the catch-all bucket
pub const UNKNOWN_KEY: &str = "UNKNOWN";

/// One bar / pie slice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Normalized status, e.g. `IN_PROGRESS`
    pub key: String,
    /// Display label, e.g. `In Progress`
    pub label: String,
    pub count: usize,
}

/// What to do with statuses outside the known set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownPolicy {
    Drop,
    /// Count them in a trailing `Unknown` bucket
    Bucket,
}

/// Count items per known status, in the order of `known`.
///
/// With [`UnknownPolicy::Bucket`] the counts always sum to `items.len()`:
/// missing and unrecognized statuses land in the `Unknown` bucket.
pub fn bucket_by_status<T, F>(items: &[T], status_of: F, known: &[&str], policy: UnknownPolicy) -> Vec<Bucket>
where
    F: Fn(&T) -> Option<&str>,
{
    let keys: Vec<String> = known.iter().map(|k| normalize_status(k)).collect();
    let mut counts = vec![0usize; keys.len()];
    let mut unknown = 0usize;

    for item in items {
        let normalized = status_of(item).map(normalize_status);
        match normalized.and_then(|s| keys.iter().position(|k| *k == s)) {
            Some(idx) => counts[idx] += 1,
            None => unknown += 1,
        }
    }

    let mut buckets: Vec<Bucket> = keys
        .into_iter()
        .zip(counts)
        .map(|(key, count)| Bucket {
            label: status_label(&key),
            key,
            count,
        })
        .collect();

    if policy == UnknownPolicy::Bucket {
        buckets.push(Bucket {
            key: UNKNOWN_KEY.to_string(),
            label: "Unknown".to_string(),
            count: unknown,
        });
    }

    buckets
}

/// `LOW`, `MEDIUM`, `HIGH`, `CRITICAL`, then `Unknown`
pub fn bucket_by_priority<T, F>(items: &[T], priority_of: F) -> Vec<Bucket>
where
    F: Fn(&T) -> Option<&str>,
{
    bucket_by_status(items, priority_of, &PRIORITIES, UnknownPolicy::Bucket)
}
