//! Derived, per-run results of a scan.

use crate::constants;
use crate::models::application::CredentialKind;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Resolved notification recipient for an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    Address(String),
    NotDefined,
}

impl Recipient {
    pub fn as_str(&self) -> &str {
        match self {
            Recipient::Address(addr) => addr,
            Recipient::NotDefined => constants::RECIPIENT_NOT_DEFINED,
        }
    }

    /// Deliverable address; `None` for the placeholder in either form.
    pub fn address(&self) -> Option<&str> {
        match self {
            Recipient::Address(addr) if addr != constants::RECIPIENT_NOT_DEFINED => Some(addr),
            _ => None,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Recipient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One credential inside the warning window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringCredentialRecord {
    pub app_name: String,
    pub app_id: String,
    pub credential_name: String,
    pub kind: CredentialKind,
    pub expires_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub notify_email: Recipient,
}

/// Records sharing one owner recipient, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationGroup {
    pub recipient: String,
    pub records: Vec<ExpiringCredentialRecord>,
}

/// An application left out of the scan under the isolate policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedApplication {
    pub app_name: String,
    pub app_id: String,
    pub reason: String,
}

/// Immutable result of the scan phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub records: Vec<ExpiringCredentialRecord>,
    pub skipped: Vec<SkippedApplication>,
}
