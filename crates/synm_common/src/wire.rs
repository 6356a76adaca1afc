//! Small JSON envelopes exchanged with the store.

use serde::{Deserialize, Serialize};

/// `GET /api/auth/status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub initialized: bool,
}

/// `POST /api/auth/init`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInitResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub key: String,
}

/// Form body of `POST /api/auth/init`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthInitForm {
    #[serde(default)]
    pub key: Option<String>,
}

/// `POST /api/action/{intent}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
}

/// `POST /api/server/settings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error body used for 401/404 answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
