//! Persisted viewer session (token + role)

use crate::role::Role;
use serde::{Deserialize, Serialize};

/// The two persisted values written at sign-in and cleared at sign-out.
///
/// Both are kept as raw strings: the role is only parsed when the gate asks
/// for it, so a forged or stale value is still visible as "some role".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    /// Session for a freshly signed-in viewer
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role.as_str().to_string()),
        }
    }

    /// Session built from raw stored strings
    pub fn from_raw(token: Option<String>, role: Option<String>) -> Self {
        Self { token, role }
    }

    /// Token, if present and non-empty
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Raw role string, if present and non-empty
    pub fn raw_role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }

    /// Parsed role; `None` when absent or unknown
    pub fn role(&self) -> Option<Role> {
        self.raw_role().and_then(|r| r.parse().ok())
    }

    /// Both values present
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.raw_role().is_some()
    }
}
