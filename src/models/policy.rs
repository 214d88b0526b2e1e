//! Run policy: failure handling and owner-tag sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a phase does when one unit of work (an application, a send) fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// The first failure aborts the run.
    #[default]
    Abort,
    /// Failures are logged, collected, and the run continues.
    Isolate,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::Abort => f.write_str("abort"),
            FailureMode::Isolate => f.write_str("isolate"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    pub on_application_error: FailureMode,
    pub on_dispatch_error: FailureMode,
}

/// Application metadata field that may carry a `NotifyEmail=` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerSource {
    InfoNotes,
    Notes,
}

impl OwnerSource {
    pub fn label(&self) -> &'static str {
        match self {
            OwnerSource::InfoNotes => "Info.Notes",
            OwnerSource::Notes => "Notes",
        }
    }
}

/// Default lookup order: `Info.Notes` first, then top-level `Notes`.
pub const DEFAULT_OWNER_SOURCES: &[OwnerSource] = &[OwnerSource::InfoNotes, OwnerSource::Notes];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySection {
    #[serde(default)]
    pub on_application_error: FailureMode,

    #[serde(default)]
    pub on_dispatch_error: FailureMode,

    /// Forward the run summary line to journald.
    #[serde(default)]
    pub journald_summary: bool,
}

impl PolicySection {
    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy {
            on_application_error: self.on_application_error,
            on_dispatch_error: self.on_dispatch_error,
        }
    }
}
