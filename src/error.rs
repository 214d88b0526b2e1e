//! Typed failures for each phase of an audit run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Token acquisition or connection to the identity provider failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Listing application registrations failed.
    #[error("directory query failed: {0}")]
    DirectoryQuery(String),

    /// One application record could not be turned into a scannable snapshot.
    #[error("application '{app_name}' ({app_id}) is malformed: {reason}")]
    Application {
        app_name: String,
        app_id: String,
        reason: String,
    },

    /// A mail send failed.
    #[error("mail dispatch to {recipient} failed: {reason}")]
    Dispatch { recipient: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
