//! Application registrations and their credentials, as read from the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialKind {
    Secret,
    Certificate,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Secret => "Secret",
            CredentialKind::Certificate => "Certificate",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secret or certificate bound to an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub display_name: Option<String>,
    pub kind: CredentialKind,
    /// `None` means the credential never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read-only snapshot of one application registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Directory object id.
    pub id: String,
    /// Client (application) id, used for portal links and reports.
    pub app_id: String,
    pub display_name: String,
    pub notes: Option<String>,
    pub info_notes: Option<String>,
    pub credentials: Vec<Credential>,
}
