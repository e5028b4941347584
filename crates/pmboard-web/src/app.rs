//! Main Leptos App component with the role-prefixed router
//!
//! Every protected path is resolved against `pmboard_core::access::ROUTES`,
//! so the gate and the sidebar share one route table.

use leptos::prelude::*;
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::use_location,
    path,
};
use pmboard_core::access::{resolve, Resolved, Screen};

use crate::components::{Header, NotFound, ProtectedRoute, PublicRoute, Sidebar, ToastProvider};
use crate::pages::{Assignments, Dashboard, Notifications, Projects, SignIn, TicketDetail, Tickets, Updates, Users};
use crate::session::{use_session, SessionProvider};

#[component]
pub fn App() -> impl IntoView {
    view! {
        <SessionProvider>
            <ToastProvider>
                <Router>
                    <Shell />
                </Router>
            </ToastProvider>
        </SessionProvider>
    }
}

#[component]
fn Shell() -> impl IntoView {
    let session = use_session();
    // Mobile sidebar state
    let (sidebar_open, set_sidebar_open) = signal(false);

    view! {
        <div class="app">
            <Header sidebar_open set_sidebar_open />
            <div class="layout">
                <Show when=move || session.session().is_authenticated()>
                    <Sidebar sidebar_open set_sidebar_open />
                </Show>
                <main class="content">
                    <Routes fallback=NotFound>
                        <Route path=path!("/") view=|| view! { <PublicRoute><SignIn /></PublicRoute> } />
                        <Route path=path!("/*any") view=RoleScreen />
                    </Routes>
                </main>
            </div>
        </div>
    }
}

/// Renders whatever `ROUTES` maps the current path to, behind the gate
#[component]
fn RoleScreen() -> impl IntoView {
    let location = use_location();
    let resolved = Memo::new(move |_| resolve(&location.pathname.get()));

    move || match resolved.get() {
        Some(resolved) => {
            let allowed = resolved.route.allowed;
            view! {
                <ProtectedRoute allowed>{screen_view(&resolved)}</ProtectedRoute>
            }
            .into_any()
        }
        None => view! { <NotFound /> }.into_any(),
    }
}

fn screen_view(resolved: &Resolved) -> AnyView {
    match (resolved.route.screen, resolved.detail.clone()) {
        (Screen::Tickets, Some(id)) => view! { <TicketDetail id /> }.into_any(),
        (Screen::Dashboard, _) => match resolved.route.allowed.first() {
            Some(&role) => view! { <Dashboard role /> }.into_any(),
            None => view! { <NotFound /> }.into_any(),
        },
        (Screen::Projects, _) => view! { <Projects /> }.into_any(),
        (Screen::Tickets, None) => view! { <Tickets /> }.into_any(),
        (Screen::Users, _) => view! { <Users /> }.into_any(),
        (Screen::Assignments, _) => view! { <Assignments /> }.into_any(),
        (Screen::Updates, _) => view! { <Updates /> }.into_any(),
        (Screen::Notifications, _) => view! { <Notifications /> }.into_any(),
    }
}
