//! Sign-in payloads

use serde::{Deserialize, Serialize};

/// Sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Sign-in reply. The role stays a raw string until the gate parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub role: String,
}
