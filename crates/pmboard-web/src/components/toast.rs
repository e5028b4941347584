//! Toast notifications

use leptos::prelude::*;
use pmboard_core::{CoreError, Notice, NoticeLevel, Notifier};
use std::time::Duration;

fn icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "ℹ️",
        NoticeLevel::Success => "✅",
        NoticeLevel::Warning => "⚠️",
        NoticeLevel::Error => "❌",
    }
}

fn class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "toast-info",
        NoticeLevel::Success => "toast-success",
        NoticeLevel::Warning => "toast-warning",
        NoticeLevel::Error => "toast-error",
    }
}

/// A notice on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: usize,
    pub notice: Notice,
    pub auto_dismiss_ms: Option<u64>,
}

impl Toast {
    fn new(id: usize, notice: Notice) -> Self {
        // Errors stay longer
        let ms = if notice.level == NoticeLevel::Error { 5000 } else { 3000 };
        Self {
            id,
            notice,
            auto_dismiss_ms: Some(ms),
        }
    }
}

/// Global toast state
#[derive(Clone, Copy)]
pub struct ToastContext {
    toasts: RwSignal<Vec<Toast>>,
    next_id: RwSignal<usize>,
}

impl ToastContext {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(0),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notice::success(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notice::info(message));
    }

    /// Error toast with the error's user message
    pub fn error(&self, error: &CoreError) {
        self.notify(Notice::from_error(error));
    }

    pub fn dismiss(&self, id: usize) {
        self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.get()
    }
}

impl Notifier for ToastContext {
    fn notify(&self, notice: Notice) {
        let id = self.next_id.get_untracked();
        self.next_id.update(|n| *n += 1);

        let toast = Toast::new(id, notice);
        let auto_dismiss_ms = toast.auto_dismiss_ms;
        self.toasts.update(|toasts| toasts.push(toast));

        if let Some(ms) = auto_dismiss_ms {
            let toasts = self.toasts;
            set_timeout(
                move || {
                    let _ = toasts.try_update(|toasts| toasts.retain(|t| t.id != id));
                },
                Duration::from_millis(ms),
            );
        }
    }
}

impl Default for ToastContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Toast provider component (wraps app root)
#[component]
pub fn ToastProvider(children: Children) -> impl IntoView {
    provide_context(ToastContext::new());

    view! {
        {children()}
        <ToastContainer />
    }
}

#[component]
fn ToastContainer() -> impl IntoView {
    let toast_context = use_toast();

    view! {
        <div class="toast-container">
            <For
                each=move || toast_context.toasts()
                key=|toast| toast.id
                children=move |toast| view! { <ToastItem toast=toast /> }
            />
        </div>
    }
}

#[component]
fn ToastItem(toast: Toast) -> impl IntoView {
    let toast_context = use_toast();
    let id = toast.id;

    view! {
        <div class=format!("toast {}", class(toast.notice.level))>
            <div class="toast-content">
                <span class="toast-icon">{icon(toast.notice.level)}</span>
                <span class="toast-message">{toast.notice.message}</span>
            </div>
            <button class="toast-close" on:click=move |_| toast_context.dismiss(id) aria-label="Dismiss">
                "×"
            </button>
        </div>
    }
}

/// Hook to access toast context
pub fn use_toast() -> ToastContext {
    expect_context::<ToastContext>()
}
