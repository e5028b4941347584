//! Browser session: a pluggable store (default `localStorage`) plus a
//! reactive context
//!
//! The gate reads the store synchronously on every render; the context
//! carries a version signal so views re-run after sign-in and sign-out.

use leptos::prelude::*;
use pmboard_core::types::Session;
use pmboard_core::{CoreError, SessionStore};
use std::cell::RefCell;
use std::sync::Arc;

const TOKEN_KEY: &str = "token";
const ROLE_KEY: &str = "role";

/// `localStorage` keys `token` and `role`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageSessionStore;

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn storage_error(action: &str) -> CoreError {
    CoreError::SessionStore {
        message: format!("Browser storage unavailable ({})", action),
    }
}

impl SessionStore for LocalStorageSessionStore {
    fn get(&self) -> Session {
        let Some(storage) = storage() else {
            return Session::default();
        };
        let read = |key: &str| storage.get_item(key).ok().flatten();
        Session::from_raw(read(TOKEN_KEY), read(ROLE_KEY))
    }

    fn set(&self, session: Session) -> Result<(), CoreError> {
        let storage = storage().ok_or_else(|| storage_error("set"))?;
        let write = |key: &str, value: Option<&str>| match value {
            Some(value) => storage.set_item(key, value),
            None => storage.remove_item(key),
        };
        write(TOKEN_KEY, session.token())
            .and_then(|_| write(ROLE_KEY, session.raw_role()))
            .map_err(|_| storage_error("set"))
    }

    fn clear(&self) -> Result<(), CoreError> {
        let storage = storage().ok_or_else(|| storage_error("clear"))?;
        storage
            .remove_item(TOKEN_KEY)
            .and_then(|_| storage.remove_item(ROLE_KEY))
            .map_err(|_| storage_error("clear"))
    }
}

thread_local! {
    static ACTIVE_STORE: RefCell<Option<Arc<dyn SessionStore>>> = const { RefCell::new(None) };
}

/// Store installed by the nearest `SessionProvider`, `localStorage` before one mounts.
///
/// Fetchers resume outside the reactive owner, so they read this instead of
/// the context.
pub fn active_store() -> Arc<dyn SessionStore> {
    ACTIVE_STORE
        .with(|store| store.borrow().clone())
        .unwrap_or_else(|| Arc::new(LocalStorageSessionStore))
}

/// Reactive handle on the stored session
#[derive(Clone, Copy)]
pub struct SessionContext {
    version: RwSignal<u64>,
    store: StoredValue<Arc<dyn SessionStore>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::with_store(Arc::new(LocalStorageSessionStore))
    }

    pub fn with_store(store: Arc<dyn SessionStore>) -> Self {
        Self {
            version: RwSignal::new(0),
            store: StoredValue::new(store),
        }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.get_value()
    }

    /// Current session; tracked, so callers re-run after changes
    pub fn session(&self) -> Session {
        self.version.track();
        self.snapshot()
    }

    /// Untracked read, for event handlers
    pub fn snapshot(&self) -> Session {
        self.store.with_value(|store| store.get())
    }

    pub fn sign_in(&self, session: Session) -> Result<(), CoreError> {
        self.store.with_value(|store| store.set(session))?;
        self.version.update(|v| *v += 1);
        Ok(())
    }

    pub fn sign_out(&self) {
        if let Err(e) = self.store.with_value(|store| store.clear()) {
            leptos::logging::warn!("Failed to clear session: {}", e);
        }
        self.version.update(|v| *v += 1);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Provide the session context (wraps app root). Without `store` the
/// session lives in `localStorage`.
#[component]
pub fn SessionProvider(#[prop(optional)] store: Option<Arc<dyn SessionStore>>, children: Children) -> impl IntoView {
    let store = store.unwrap_or_else(|| Arc::new(LocalStorageSessionStore));
    ACTIVE_STORE.with(|active| *active.borrow_mut() = Some(store.clone()));
    provide_context(SessionContext::with_store(store));
    children()
}

/// Hook to access the session context
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}
