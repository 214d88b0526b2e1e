//! One audit run: authenticate, list, scan, render, then write or dispatch.
//!
//! ```text
//! Init -> Authenticated -> Scanned -> Rendered -> LocalWrite | RemoteDispatch -> Done
//!   any state -> Failed
//! ```
//!
//! Authentication and listing failures always abort. Per-application and
//! per-send failures abort or are isolated according to [`FailurePolicy`].
//! Writing the report file is best-effort in both modes.

use crate::core::config::{RunMode, RunOptions};
use crate::core::dispatch::{AdminReport, DispatchSummary, NotificationDispatcher};
use crate::core::{grouping, report, scanner};
use crate::error::AuditError;
use crate::graph::{Authenticator, DirectoryApplication, DirectoryClient, MailSender};
use crate::models::application::Application;
use crate::models::policy::FailureMode;
use crate::models::record::{ScanOutcome, SkippedApplication};
use crate::util::fs as report_fs;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Init,
    Authenticated,
    Scanned,
    Rendered,
    LocalWrite,
    RemoteDispatch,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub state: RunState,
    /// Every state the run passed through, starting at `Init`.
    pub transitions: Vec<RunState>,
    pub local: bool,
    pub generated_at: DateTime<Utc>,
    pub applications: usize,
    pub expiring: usize,
    pub owner_groups: usize,
    pub skipped: Vec<SkippedApplication>,
    pub report_path: Option<PathBuf>,
    pub report_write_error: Option<String>,
    pub dispatch: Option<DispatchSummary>,
    #[serde(skip)]
    pub scan: ScanOutcome,
}

pub struct Orchestrator<'a> {
    options: &'a RunOptions,
    auth: &'a dyn Authenticator,
    directory: &'a dyn DirectoryClient,
    mailer: &'a dyn MailSender,
}

struct RunTrace {
    state: RunState,
    history: Vec<RunState>,
}

impl RunTrace {
    fn new() -> Self {
        Self {
            state: RunState::Init,
            history: vec![RunState::Init],
        }
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "run state");
        self.state = next;
        self.history.push(next);
    }
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        options: &'a RunOptions,
        auth: &'a dyn Authenticator,
        directory: &'a dyn DirectoryClient,
        mailer: &'a dyn MailSender,
    ) -> Self {
        Self {
            options,
            auth,
            directory,
            mailer,
        }
    }

    /// Execute one run evaluated at `now`.
    pub fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, AuditError> {
        let mut trace = RunTrace::new();
        match self.execute(now, &mut trace) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::error!(state = %trace.state, error = %e, "audit run failed");
                trace.advance(RunState::Failed);
                Err(e)
            }
        }
    }

    /// Convert and scan each listed application under the application-error policy.
    pub fn scan_phase(
        &self,
        raw: &[DirectoryApplication],
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, AuditError> {
        let mut outcome = ScanOutcome::default();
        for entry in raw {
            let app = match Application::try_from(entry) {
                Ok(app) => app,
                Err(e) => match self.options.failure_policy.on_application_error {
                    FailureMode::Abort => return Err(e),
                    FailureMode::Isolate => {
                        tracing::warn!(app = entry.label(), error = %e, "skipping malformed application");
                        outcome.skipped.push(SkippedApplication {
                            app_name: entry.label().to_string(),
                            app_id: entry.app_id.clone().unwrap_or_else(|| entry.id.clone()),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                },
            };
            outcome.records.extend(scanner::scan_application(
                &app,
                self.options.warning_days,
                now,
                &self.options.owner_sources,
            ));
        }
        Ok(outcome)
    }

    fn write_report(&self, state: RunState, html: &str) -> (Option<PathBuf>, Option<String>) {
        debug_assert!(matches!(state, RunState::LocalWrite | RunState::RemoteDispatch));
        let Some(path) = self.options.output_path.as_ref() else {
            return (None, None);
        };
        match report_fs::write_text_atomic(path, html) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "report written");
                (Some(path.clone()), None)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(path = %path.display(), error = %reason, "cannot write report, continuing");
                (None, Some(reason))
            }
        }
    }

    fn execute(&self, now: DateTime<Utc>, trace: &mut RunTrace) -> Result<RunSummary, AuditError> {
        let token = self.auth.authenticate()?;
        trace.advance(RunState::Authenticated);

        let raw = self.directory.list_applications(&token)?;
        let scan = self.scan_phase(&raw, now)?;
        trace.advance(RunState::Scanned);
        tracing::info!(
            applications = raw.len(),
            expiring = scan.records.len(),
            skipped = scan.skipped.len(),
            warning_days = self.options.warning_days,
            "scan complete"
        );

        let admin_html = report::render_admin_report(&scan.records, now, self.options.warning_days);
        let groups = grouping::group_by_recipient(&scan.records);
        trace.advance(RunState::Rendered);

        let next = if self.options.mode.is_local() {
            RunState::LocalWrite
        } else {
            RunState::RemoteDispatch
        };
        trace.advance(next);
        let (report_path, report_write_error) = self.write_report(trace.state, &admin_html);

        let dispatch = match &self.options.mode {
            RunMode::Local => {
                if self.options.output_path.is_none() {
                    tracing::warn!("local mode without an output path, report not saved");
                }
                None
            }
            RunMode::Remote {
                sender_address,
                admin_email,
            } => {
                let dispatcher = NotificationDispatcher::new(self.mailer, &token, sender_address);
                let admin = AdminReport::new(
                    admin_email,
                    &scan.records,
                    self.options.warning_days,
                    admin_html,
                );
                Some(dispatcher.dispatch_all(
                    &admin,
                    &groups,
                    now,
                    self.options.failure_policy.on_dispatch_error,
                )?)
            }
        };

        trace.advance(RunState::Done);
        Ok(RunSummary {
            state: trace.state,
            transitions: trace.history.clone(),
            local: self.options.mode.is_local(),
            generated_at: now,
            applications: raw.len(),
            expiring: scan.records.len(),
            owner_groups: groups.len(),
            skipped: scan.skipped.clone(),
            report_path,
            report_write_error,
            dispatch,
            scan,
        })
    }
}
