//! Sidebar navigation built from the route table

use crate::session::use_session;
use leptos::prelude::*;
use leptos_router::components::A;
use pmboard_core::access::nav_for;

/// Sidebar listing the screens the signed-in role may open
#[component]
pub fn Sidebar(sidebar_open: ReadSignal<bool>, set_sidebar_open: WriteSignal<bool>) -> impl IntoView {
    let session = use_session();

    let entries = move || {
        session
            .session()
            .role()
            .map(|role| nav_for(role).collect::<Vec<_>>())
            .unwrap_or_default()
    };

    view! {
        <>
            // Backdrop overlay for mobile
            <Show when=move || sidebar_open.get()>
                <div class="sidebar-backdrop" on:click=move |_| set_sidebar_open.set(false)></div>
            </Show>

            <aside class="sidebar" class:sidebar-open=move || sidebar_open.get()>
                <button
                    class="sidebar-close"
                    on:click=move |_| set_sidebar_open.set(false)
                    aria-label="Close sidebar"
                >
                    "✕"
                </button>

                <nav class="nav">
                    <ul class="nav-list">
                        <For
                            each=entries
                            key=|route| route.path
                            children=move |route| {
                                view! {
                                    <li class="nav-item">
                                        <A
                                            href=route.path
                                            attr:class="sidebar-link"
                                            on:click=move |_| set_sidebar_open.set(false)
                                        >
                                            <span class="sidebar-link-label">{route.title}</span>
                                        </A>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </nav>
            </aside>
        </>
    }
}
