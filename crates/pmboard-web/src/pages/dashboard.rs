//! Role dashboards: stats cards and charts over projects and tickets

use super::use_reporter;
use crate::api::{self, format_number};
use crate::components::{BarChart, CardColor, ErrorFallback, ProgressList, StatsCard, TrendChart};
use crate::utils::now;
use leptos::prelude::*;
use pmboard_core::analytics::{DashboardSummary, Window};
use pmboard_core::types::Role;

#[component]
pub fn Dashboard(role: Role) -> impl IntoView {
    let reporter = use_reporter();
    let (version, set_version) = signal(0u32);

    let data = LocalResource::new(move || {
        let _ = version.get();
        async move {
            let result = api::fetch_dashboard_data().await;
            if let Err(e) = &result {
                reporter.error(e);
            }
            result
        }
    });

    // Developers look at their own week, managers at the half year
    let window = match role {
        Role::Developer => Window::last_week(),
        Role::Admin | Role::ProjectManager => Window::half_year(),
    };
    let base = role.home_path();

    view! {
        <div class="page dashboard-page">
            <h2>{format!("{} Dashboard", role.label())}</h2>
            <Suspense fallback=|| view! { <div class="loading">"Loading dashboard..."</div> }>
                {move || {
                    data.read().as_ref()
                        .map(|result| match result.as_ref() {
                            Ok((projects, tickets)) => {
                                let summary = DashboardSummary::compute(projects, tickets, window, now());
                                view! { <SummaryView summary role base /> }.into_any()
                            }
                            Err(e) => view! {
                                <ErrorFallback
                                    error=e.user_message()
                                    on_retry=Callback::new(move |_| set_version.update(|v| *v += 1))
                                />
                            }
                            .into_any(),
                        })
                }}
            </Suspense>
        </div>
    }
}

#[component]
fn SummaryView(summary: DashboardSummary, role: Role, base: &'static str) -> impl IntoView {
    let manager = role != Role::Developer;
    let trend_title = match role {
        Role::Developer => "Tickets this week",
        Role::Admin | Role::ProjectManager => "Tickets per month",
    };
    let DashboardSummary {
        total_projects,
        total_tickets,
        open_tickets,
        completion_percent,
        ticket_status,
        project_status,
        priority,
        trend,
        progress,
        type_split,
        ..
    } = summary;

    view! {
        <div class="stats-grid">
            {manager.then(|| view! {
                <StatsCard
                    label="Projects"
                    value=format_number(total_projects)
                    icon="📁"
                    href=format!("{}/projects", base)
                />
            })}
            <StatsCard
                label="Tickets"
                value=format_number(total_tickets)
                icon="🎫"
                href=format!("{}/tickets", base)
            />
            <StatsCard label="Open" value=format_number(open_tickets) icon="📂" />
            <StatsCard
                label="Completion"
                value=format!("{}%", completion_percent)
                icon="✅"
                color=CardColor::for_percent(completion_percent)
            />
            <StatsCard
                label="Issues / Tasks"
                value=format!("{}% / {}%", type_split.issue_percent, type_split.task_percent)
                icon="🧩"
            />
        </div>

        <div class="charts-grid">
            <BarChart title="Tickets by status" buckets=ticket_status />
            <BarChart title="Tickets by priority" buckets=priority />
            {manager.then(move || view! { <BarChart title="Projects by status" buckets=project_status /> })}
            <TrendChart title=trend_title periods=trend />
            {manager.then(move || view! { <ProgressList progress=progress /> })}
        </div>
    }
}
