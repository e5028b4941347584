//! Route wrappers around the session gate

use crate::session::use_session;
use leptos::prelude::*;
use leptos_router::components::{Redirect, A};
use pmboard_core::access::{authorize, public_gate, GateDecision, PublicDecision};
use pmboard_core::types::Role;

/// Renders `children` only for a signed-in session whose role is in `allowed`
#[component]
pub fn ProtectedRoute(allowed: &'static [Role], children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let decision = Memo::new(move |_| authorize(&session.session(), allowed));

    move || match decision.get() {
        GateDecision::Unauthorized => view! { <Unauthorized /> }.into_any(),
        GateDecision::Forbidden => view! { <Forbidden /> }.into_any(),
        GateDecision::Render => children().into_any(),
    }
}

/// Sign-in screen wrapper: signed-in users go to their home screen
#[component]
pub fn PublicRoute(children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let decision = Memo::new(move |_| public_gate(&session.session()));

    move || match decision.get() {
        PublicDecision::Redirect(home) => view! { <Redirect path=home /> }.into_any(),
        PublicDecision::Render => children().into_any(),
    }
}

#[component]
pub fn Unauthorized() -> impl IntoView {
    view! {
        <div class="gate-page">
            <h2>"Sign in required"</h2>
            <p>"Your session has ended or you have not signed in yet."</p>
            <A href="/" attr:class="btn btn-primary">"Go to sign in"</A>
        </div>
    }
}

#[component]
pub fn Forbidden() -> impl IntoView {
    let session = use_session();
    let home = move || session.session().role().map(|r| r.home_path()).unwrap_or("/");

    view! {
        <div class="gate-page">
            <h2>"Access denied"</h2>
            <p>"Your role does not have access to this page."</p>
            <a href=home class="btn btn-primary">"Back to my dashboard"</a>
        </div>
    }
}

/// Fallback for paths outside the route table
#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <div class="gate-page">
            <h2>"Page not found"</h2>
            <A href="/" attr:class="btn btn-primary">"Home"</A>
        </div>
    }
}
