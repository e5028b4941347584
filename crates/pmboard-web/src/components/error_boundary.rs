//! Error and empty-state displays

use leptos::prelude::*;
use pmboard_core::FieldError;

/// Full-panel error with a retry button
#[component]
pub fn ErrorFallback(
    #[prop(into)] error: String,
    #[prop(into)] on_retry: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="error-boundary">
            <div class="error-boundary-content">
                <div class="error-boundary-icon">"⚠️"</div>
                <h2 class="error-boundary-title">"Error"</h2>
                <p class="error-boundary-message">{error}</p>
                <button class="error-boundary-retry" on:click=move |_| on_retry.run(())>
                    "Retry"
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn EmptyState(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="empty-state">
            <div class="empty-state-icon">"📭"</div>
            <p class="empty-state-message">{message}</p>
        </div>
    }
}

/// Message for one form field, if validation flagged it
#[component]
pub fn FieldMessage(#[prop(into)] errors: Signal<Vec<FieldError>>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .get()
            .into_iter()
            .find(|e| e.field == field)
            .map(|e| view! { <span class="field-error">{e.message}</span> })
    }
}
