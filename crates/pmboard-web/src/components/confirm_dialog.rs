//! Confirmation dialog for destructive actions

use leptos::prelude::*;

/// Modal asking to confirm; shows a failed request's message inline
#[component]
pub fn ConfirmDialog(
    #[prop(into)] title: String,
    #[prop(into)] message: String,
    /// Request in flight
    #[prop(into)]
    busy: Signal<bool>,
    /// Message of the last failed attempt
    #[prop(into)]
    error: Signal<Option<String>>,
    on_confirm: Callback<()>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="modal-backdrop" on:click=move |_| on_cancel.run(())>
            <div class="modal" on:click=|e| e.stop_propagation()>
                <h3 class="modal-title">{title}</h3>
                <p>{message}</p>
                {move || error.get().map(|e| view! { <p class="form-error">{e}</p> })}
                <div class="modal-actions">
                    <button class="btn btn-secondary" on:click=move |_| on_cancel.run(()) disabled=move || busy.get()>
                        "Cancel"
                    </button>
                    <button class="btn btn-danger" on:click=move |_| on_confirm.run(()) disabled=move || busy.get()>
                        {move || if busy.get() { "Deleting..." } else { "Delete" }}
                    </button>
                </div>
            </div>
        </div>
    }
}
