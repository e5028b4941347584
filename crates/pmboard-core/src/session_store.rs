//! Swappable persistence for the viewer session
//!
//! The gate and the HTTP client read the session through [`SessionStore`]
//! instead of a global, so tests can use memory and each frontend can pick
//! its own backing (a file for the CLI, browser storage for the web app).

use crate::error::CoreError;
use parking_lot::RwLock;
use pmboard_types::Session;

/// Read/write access to the persisted session
pub trait SessionStore: Send + Sync {
    /// Current session; an unreadable store reads as signed out
    fn get(&self) -> Session;

    /// Replace the session (sign-in)
    fn set(&self, session: Session) -> Result<(), CoreError>;

    /// Forget the session (sign-out)
    fn clear(&self) -> Result<(), CoreError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Session {
        self.session.read().clone()
    }

    fn set(&self, session: Session) -> Result<(), CoreError> {
        *self.session.write() = session;
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.session.write() = Session::default();
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileSessionStore;

#[cfg(feature = "native")]
mod file {
    use super::SessionStore;
    use crate::error::CoreError;
    use pmboard_types::Session;
    use std::path::{Path, PathBuf};
    use tracing::{debug, info, warn};

    /// Session file name inside the pmboard config directory
    pub const SESSION_FILE: &str = "session.json";

    /// JSON file store used by the CLI (`<config_dir>/session.json`)
    #[derive(Debug, Clone)]
    pub struct FileSessionStore {
        path: PathBuf,
    }

    impl FileSessionStore {
        pub fn new(path: PathBuf) -> Self {
            Self { path }
        }

        /// Store in `<dir>/session.json`
        pub fn in_dir(dir: &Path) -> Self {
            Self::new(dir.join(SESSION_FILE))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl SessionStore for FileSessionStore {
        fn get(&self) -> Session {
            let content = match std::fs::read_to_string(&self.path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %self.path.display(), "No session file");
                    return Session::default();
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                    return Session::default();
                }
            };

            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "Malformed session file, treating as signed out");
                Session::default()
            })
        }

        fn set(&self, session: Session) -> Result<(), CoreError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| CoreError::FileWrite {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            let content = serde_json::to_string_pretty(&session).map_err(|source| {
                CoreError::JsonParse {
                    path: self.path.clone(),
                    message: "Failed to serialize session".to_string(),
                    source,
                }
            })?;

            std::fs::write(&self.path, content).map_err(|source| CoreError::FileWrite {
                path: self.path.clone(),
                source,
            })?;

            restrict_permissions(&self.path);
            info!(role = session.raw_role().unwrap_or("-"), "Session saved");
            Ok(())
        }

        fn clear(&self) -> Result<(), CoreError> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {
                    info!("Session cleared");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(CoreError::FileWrite {
                    path: self.path.clone(),
                    source,
                }),
            }
        }
    }

    /// The file holds a bearer token: keep it owner-only
    #[cfg(unix)]
    fn restrict_permissions(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
            warn!(path = %path.display(), error = %e, "Failed to restrict session file permissions");
        }
    }

    #[cfg(not(unix))]
    fn restrict_permissions(_path: &Path) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmboard_types::Role;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemorySessionStore::new();
        assert!(!store.get().is_authenticated());

        store.set(Session::new("tok", Role::Admin)).unwrap();
        assert_eq!(store.get().role(), Some(Role::Admin));

        store.clear().unwrap();
        assert_eq!(store.get(), Session::default());
    }

    #[test]
    fn test_store_usable_as_trait_object() {
        let store: std::sync::Arc<dyn SessionStore> =
            std::sync::Arc::new(MemorySessionStore::with_session(Session::new("t", Role::Developer)));
        assert!(store.get().is_authenticated());
    }
}
