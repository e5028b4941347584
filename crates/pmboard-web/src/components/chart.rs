//! Plain HTML/CSS charts fed by the analytics buckets

use leptos::prelude::*;
use pmboard_core::analytics::{percent, status_label, Bucket, PeriodBucket, ProjectProgress};

/// Horizontal bars, one per bucket, widths relative to the total
#[component]
pub fn BarChart(#[prop(into)] title: String, buckets: Vec<Bucket>) -> impl IntoView {
    let total: usize = buckets.iter().map(|b| b.count).sum();

    view! {
        <div class="card chart">
            <h3 class="chart-title">{title}</h3>
            {if total == 0 {
                view! { <p class="chart-empty">"No data"</p> }.into_any()
            } else {
                buckets
                    .into_iter()
                    .map(|bucket| {
                        let width = percent(bucket.count, total);
                        view! {
                            <div class="bar-row">
                                <span class="bar-label">{status_label(&bucket.label)}</span>
                                <div class="bar-track">
                                    <div
                                        class=format!("bar-fill bar-{}", bucket.key.to_lowercase())
                                        style=format!("width: {}%", width)
                                    ></div>
                                </div>
                                <span class="bar-value">{bucket.count}</span>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}

/// Stacked open/closed columns per period
#[component]
pub fn TrendChart(#[prop(into)] title: String, periods: Vec<PeriodBucket>) -> impl IntoView {
    let max = periods.iter().map(PeriodBucket::total).max().unwrap_or(0).max(1);

    view! {
        <div class="card chart">
            <h3 class="chart-title">{title}</h3>
            <div class="trend">
                {periods
                    .into_iter()
                    .map(|period| {
                        let open = percent(period.open, max);
                        let closed = percent(period.closed, max);
                        let tooltip = format!("{}: {} open, {} closed", period.key, period.open, period.closed);
                        view! {
                            <div class="trend-column" title=tooltip>
                                <div class="trend-stack">
                                    <div class="trend-open" style=format!("height: {}%", open)></div>
                                    <div class="trend-closed" style=format!("height: {}%", closed)></div>
                                </div>
                                <span class="trend-label">{period.label}</span>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
            <div class="trend-legend">
                <span class="legend-open">"Open"</span>
                <span class="legend-closed">"Closed"</span>
            </div>
        </div>
    }
}

/// Per-project completion bars
#[component]
pub fn ProgressList(progress: Vec<ProjectProgress>) -> impl IntoView {
    view! {
        <div class="card chart">
            <h3 class="chart-title">"Project Progress"</h3>
            {if progress.is_empty() {
                view! { <p class="chart-empty">"No projects"</p> }.into_any()
            } else {
                progress
                    .into_iter()
                    .map(|p| {
                        view! {
                            <div class="bar-row">
                                <span class="bar-label">{p.name}</span>
                                <div class="bar-track">
                                    <div class="bar-fill bar-done" style=format!("width: {}%", p.percent)></div>
                                </div>
                                <span class="bar-value">{format!("{}% ({}/{})", p.percent, p.closed, p.total)}</span>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}
