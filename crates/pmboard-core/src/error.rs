//! Error types for pmboard-core
//!
//! One error enum for the data layer. Screens turn it into user-facing text
//! with [`CoreError::user_message`]; nothing here talks to the UI.

use crate::validation::FieldError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Shown when an error carries nothing better to say
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Core error type for pmboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected response shape from {endpoint}: {message}")]
    UnexpectedShape { endpoint: String, message: String },

    // ===================
    // HTTP Errors
    // ===================
    #[error("Request to {endpoint} failed")]
    Network {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 401; `message` is the backend's `{ message }` body, possibly empty
    #[error("Not authenticated")]
    Unauthenticated { message: String },

    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    // ===================
    // Session Errors
    // ===================
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Session store error: {message}")]
    SessionStore { message: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Config directory not found")]
    ConfigDirNotFound,

    // ===================
    // Validation
    // ===================
    #[error("Validation failed: {}", format_field_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    /// Error shared between callers of a de-duplicated fetch
    #[error(transparent)]
    Shared(Arc<CoreError>),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoreError {
    /// Text to put in front of the user (toast, banner, stderr).
    ///
    /// Prefers the backend-provided message and falls back to
    /// [`FALLBACK_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            CoreError::Api { .. } => FALLBACK_MESSAGE.to_string(),
            CoreError::Fetch { message } if !message.trim().is_empty() => message.clone(),
            CoreError::Network { .. } => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            CoreError::Unauthenticated { message } if !message.trim().is_empty() => message.clone(),
            CoreError::Unauthenticated { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            CoreError::NotSignedIn => "Please sign in first.".to_string(),
            CoreError::Validation { errors } => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            CoreError::Shared(inner) => inner.user_message(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Whether the viewer should be sent back to sign-in
    pub fn requires_sign_in(&self) -> bool {
        match self {
            CoreError::Unauthenticated { .. } | CoreError::NotSignedIn => true,
            CoreError::Shared(inner) => inner.requires_sign_in(),
            _ => false,
        }
    }

    /// A 401 from the sign-in endpoint means bad credentials, not an
    /// expired session
    pub fn into_sign_in_failure(self) -> Self {
        match self {
            CoreError::Unauthenticated { message } => CoreError::Api {
                status: 401,
                message,
            },
            other => other,
        }
    }

    /// Convenience for fetchers that only have a message
    pub fn fetch(message: impl Into<String>) -> Self {
        CoreError::Fetch {
            message: message.into(),
        }
    }
}
