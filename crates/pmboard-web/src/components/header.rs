//! Header component

use crate::session::use_session;
use leptos::prelude::*;

/// Header with logo, signed-in role and sign-out
#[component]
pub fn Header(sidebar_open: ReadSignal<bool>, set_sidebar_open: WriteSignal<bool>) -> impl IntoView {
    let session = use_session();
    let sign_out = move |_| {
        session.sign_out();
        // Full reload drops every screen's in-memory state
        if let Err(e) = window().location().set_href("/") {
            leptos::logging::warn!("Failed to redirect after sign-out: {:?}", e);
        }
    };

    view! {
        <header class="header">
            <button
                class="hamburger"
                on:click=move |_| set_sidebar_open.update(|v| *v = !*v)
                aria-label="Toggle sidebar"
                aria-expanded=move || sidebar_open.get().to_string()
            >
                <span class="hamburger-icon">"☰"</span>
            </button>

            <div class="header-content">
                <h1 class="logo">"pmboard"</h1>
                <p class="subtitle">"Project Management Dashboard"</p>
            </div>

            <Show when=move || session.session().is_authenticated()>
                <div class="header-user">
                    <span class="badge">
                        {move || session.session().role().map(|r| r.label()).unwrap_or("Unknown role")}
                    </span>
                    <button class="btn btn-secondary" on:click=sign_out>"Sign out"</button>
                </div>
            </Show>
        </header>
    }
}
