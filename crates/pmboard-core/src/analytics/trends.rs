//! Per-period open/closed trends
//!
//! Buckets are computed in UTC so the same input and `now` always produce
//! the same array.

use super::is_closed;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lookback window ending at (and including) the period containing `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Window {
    Months(u32),
    Days(u32),
}

impl Window {
    /// Dashboard default: six months
    pub fn half_year() -> Self {
        Self::Months(6)
    }

    pub fn last_week() -> Self {
        Self::Days(7)
    }

    fn key_of(&self, ts: DateTime<Utc>) -> String {
        match self {
            Window::Months(_) => ts.format("%Y-%m").to_string(),
            Window::Days(_) => ts.format("%Y-%m-%d").to_string(),
        }
    }

    /// Period starts, oldest first
    fn periods(&self, now: DateTime<Utc>) -> Vec<NaiveDate> {
        let today = now.date_naive();
        match *self {
            Window::Months(n) => {
                let current = today.year() * 12 + today.month0() as i32;
                (0..n as i32)
                    .rev()
                    .filter_map(|back| {
                        let index = current - back;
                        NaiveDate::from_ymd_opt(
                            index.div_euclid(12),
                            index.rem_euclid(12) as u32 + 1,
                            1,
                        )
                    })
                    .collect()
            }
            Window::Days(n) => (0..n as u64)
                .rev()
                .filter_map(|back| today.checked_sub_days(Days::new(back)))
                .collect(),
        }
    }

    fn period_key(&self, start: NaiveDate) -> String {
        match self {
            Window::Months(_) => start.format("%Y-%m").to_string(),
            Window::Days(_) => start.format("%Y-%m-%d").to_string(),
        }
    }

    fn period_label(&self, start: NaiveDate) -> String {
        match self {
            Window::Months(_) => start.format("%b").to_string(),
            Window::Days(_) => start.format("%a").to_string(),
        }
    }
}

/// One period of a trend chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// `YYYY-MM` or `YYYY-MM-DD`
    pub key: String,
    /// `Jan` or `Mon`
    pub label: String,
    pub open: usize,
    pub closed: usize,
}

impl PeriodBucket {
    pub fn total(&self) -> usize {
        self.open + self.closed
    }
}

/// Bucket items by timestamp into the periods of `window`.
///
/// Every in-window item lands in exactly one bucket, counted as closed when
/// its status is in [`CLOSED_STATUSES`](super::CLOSED_STATUSES). Items
/// without a timestamp or outside the window are dropped.
pub fn bucket_by_period<T, TS, ST>(
    items: &[T],
    timestamp_of: TS,
    status_of: ST,
    window: Window,
    now: DateTime<Utc>,
) -> Vec<PeriodBucket>
where
    TS: Fn(&T) -> Option<DateTime<Utc>>,
    ST: Fn(&T) -> Option<&str>,
{
    let mut buckets: Vec<PeriodBucket> = window
        .periods(now)
        .into_iter()
        .map(|start| PeriodBucket {
            key: window.period_key(start),
            label: window.period_label(start),
            open: 0,
            closed: 0,
        })
        .collect();

    let index: HashMap<String, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (b.key.clone(), i))
        .collect();

    for item in items {
        let Some(ts) = timestamp_of(item) else {
            continue;
        };
        let Some(&i) = index.get(&window.key_of(ts)) else {
            continue;
        };
        if status_of(item).map(is_closed).unwrap_or(false) {
            buckets[i].closed += 1;
        } else {
            buckets[i].open += 1;
        }
    }

    buckets
}
