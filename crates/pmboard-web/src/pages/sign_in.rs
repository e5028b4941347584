//! Sign-in screen

use crate::api;
use crate::components::{use_toast, FieldMessage};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pmboard_core::types::{Credentials, Session};
use pmboard_core::validation::validate_credentials;
use pmboard_core::FieldError;

#[component]
pub fn SignIn() -> impl IntoView {
    let session = use_session();
    let toast = use_toast();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let errors = RwSignal::new(Vec::<FieldError>::new());
    let (busy, set_busy) = signal(false);
    let (failure, set_failure) = signal(None::<String>);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let credentials = Credentials {
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        let problems = validate_credentials(&credentials);
        let invalid = !problems.is_empty();
        errors.set(problems);
        if invalid {
            return;
        }

        set_busy.set(true);
        set_failure.set(None);
        spawn_local(async move {
            match api::sign_in(&credentials).await {
                Ok(response) => {
                    let signed_in = Session::from_raw(Some(response.token), Some(response.role));
                    if let Err(e) = session.sign_in(signed_in) {
                        toast.error(&e);
                    }
                }
                Err(e) => set_failure.set(Some(e.user_message())),
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="sign-in-page">
            <form class="card sign-in-card" on:submit=submit>
                <h2>"Sign in"</h2>
                <label class="form-field">
                    <span>"Email"</span>
                    <input
                        type="email"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |e| set_email.set(event_target_value(&e))
                    />
                    <FieldMessage errors=errors field="email" />
                </label>
                <label class="form-field">
                    <span>"Password"</span>
                    <input
                        type="password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |e| set_password.set(event_target_value(&e))
                    />
                    <FieldMessage errors=errors field="password" />
                </label>
                {move || failure.get().map(|message| view! { <p class="form-error">{message}</p> })}
                <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                    {move || if busy.get() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>
        </div>
    }
}
