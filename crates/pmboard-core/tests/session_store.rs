//! File-backed session store

use pmboard_core::types::{Role, Session};
use pmboard_core::{FileSessionStore, SessionStore};
use tempfile::tempdir;

#[test]
fn test_missing_file_reads_signed_out() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::in_dir(dir.path());
    assert!(!store.get().is_authenticated());
}

#[test]
fn test_set_get_clear() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::in_dir(&dir.path().join("pmboard"));

    store.set(Session::new("abc.def", Role::ProjectManager)).unwrap();
    let session = store.get();
    assert_eq!(session.token(), Some("abc.def"));
    assert_eq!(session.role(), Some(Role::ProjectManager));

    // A second store on the same file sees the same session
    let other = FileSessionStore::in_dir(&dir.path().join("pmboard"));
    assert!(other.get().is_authenticated());

    store.clear().unwrap();
    assert!(!store.get().is_authenticated());
    // Clearing twice is fine
    store.clear().unwrap();
}

#[test]
fn test_malformed_file_reads_signed_out() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::in_dir(dir.path());
    std::fs::write(store.path(), "{ not json").unwrap();
    assert_eq!(store.get(), Session::default());
}

#[cfg(unix)]
#[test]
fn test_session_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let store = FileSessionStore::in_dir(dir.path());
    store.set(Session::new("t", Role::Admin)).unwrap();
    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
