//! Run-summary forwarding to journald.
//!
//! The audit summary goes out as one `key=value` line piped into
//! `systemd-cat`. Forwarding is best-effort: callers log the error and carry
//! on, the audit outcome never depends on it.

use crate::core::orchestrator::RunSummary;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// A command that receives one line on stdin per forward.
pub struct JournalForwarder {
    program: OsString,
    args: Vec<OsString>,
}

impl JournalForwarder {
    /// `systemd-cat -t <tag>`.
    pub fn systemd_cat(tag: &str) -> Self {
        Self::with_command("systemd-cat", ["-t", tag])
    }

    pub fn with_command<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Pipe `line` into the command and wait for it to exit.
    pub fn forward(&self, line: &str) -> io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(line.as_bytes())?;
            stdin.write_all(b"\n")?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "{} exited with {}",
                self.program.to_string_lossy(),
                status
            )));
        }
        tracing::debug!(program = %self.program.to_string_lossy(), "run summary forwarded");
        Ok(())
    }
}

/// Flatten a run summary into journal fields.
///
/// Values never contain spaces except the report path and the write error,
/// which are quoted.
pub fn summary_line(summary: &RunSummary) -> String {
    let mut fields = vec![
        format!("state={}", summary.state),
        format!("mode={}", if summary.local { "local" } else { "remote" }),
        format!("generated_at={}", summary.generated_at.to_rfc3339()),
        format!("applications={}", summary.applications),
        format!("expiring={}", summary.expiring),
        format!("owner_groups={}", summary.owner_groups),
        format!("skipped={}", summary.skipped.len()),
    ];
    if let Some(dispatch) = &summary.dispatch {
        fields.push(format!("mail_attempted={}", dispatch.attempted));
        fields.push(format!("mail_delivered={}", dispatch.delivered.len()));
        fields.push(format!("mail_failed={}", dispatch.failed.len()));
    }
    if let Some(path) = &summary.report_path {
        fields.push(format!("report={:?}", path.display().to_string()));
    }
    if let Some(err) = &summary.report_write_error {
        fields.push(format!("report_error={:?}", err));
    }
    fields.join(" ")
}

/// Forward `summary` through `forwarder`, logging instead of failing.
///
/// Returns whether the line was delivered.
pub fn forward_summary(forwarder: &JournalForwarder, summary: &RunSummary) -> bool {
    match forwarder.forward(&summary_line(summary)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "cannot forward run summary to journald");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::{DispatchFailure, DispatchSummary};
    use crate::core::orchestrator::RunState;
    use crate::models::record::ScanOutcome;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn summary() -> RunSummary {
        RunSummary {
            state: RunState::Done,
            transitions: Vec::new(),
            local: false,
            generated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            applications: 6,
            expiring: 4,
            owner_groups: 2,
            skipped: Vec::new(),
            report_path: Some(PathBuf::from("/var/lib/appcred/report.html")),
            report_write_error: None,
            dispatch: Some(DispatchSummary {
                attempted: 3,
                delivered: vec!["admin@x.com".into(), "team@x.com".into()],
                failed: vec![DispatchFailure {
                    recipient: "solo@x.com".into(),
                    reason: "status 500".into(),
                }],
            }),
            scan: ScanOutcome::default(),
        }
    }

    #[test]
    fn test_summary_line_fields() {
        assert_eq!(
            summary_line(&summary()),
            "state=Done mode=remote generated_at=2025-01-01T00:00:00+00:00 applications=6 \
             expiring=4 owner_groups=2 skipped=0 mail_attempted=3 mail_delivered=2 \
             mail_failed=1 report=\"/var/lib/appcred/report.html\""
        );
    }

    #[test]
    fn test_summary_line_local_without_report() {
        let mut s = summary();
        s.local = true;
        s.dispatch = None;
        s.report_path = None;
        s.report_write_error = Some("permission denied".into());
        let line = summary_line(&s);
        assert!(line.contains("mode=local"));
        assert!(!line.contains("mail_"));
        assert!(line.ends_with("report_error=\"permission denied\""));
    }

    #[test]
    fn test_forward_pipes_line_to_command() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("journal.txt");
        let forwarder = JournalForwarder::with_command(
            "sh",
            [
                OsString::from("-c"),
                OsString::from("cat > \"$0\""),
                out.clone().into_os_string(),
            ],
        );
        forwarder.forward("state=Done expiring=4").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "state=Done expiring=4\n");
    }

    #[test]
    fn test_forward_summary_sends_summary_line() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("journal.txt");
        let forwarder = JournalForwarder::with_command(
            "sh",
            [
                OsString::from("-c"),
                OsString::from("cat > \"$0\""),
                out.clone().into_os_string(),
            ],
        );
        assert!(forward_summary(&forwarder, &summary()));
        let sent = fs::read_to_string(&out).unwrap();
        assert_eq!(sent, format!("{}\n", summary_line(&summary())));
    }

    #[test]
    fn test_forward_summary_swallows_errors() {
        let forwarder =
            JournalForwarder::with_command("appcred-watch-no-such-program", Vec::<&str>::new());
        assert!(!forward_summary(&forwarder, &summary()));
    }

    #[test]
    fn test_forward_reports_failing_command() {
        let forwarder = JournalForwarder::with_command("sh", ["-c", "cat >/dev/null; exit 3"]);
        assert!(forwarder.forward("x").is_err());
    }

    #[test]
    fn test_forward_reports_missing_program() {
        let forwarder =
            JournalForwarder::with_command("appcred-watch-no-such-program", Vec::<&str>::new());
        assert!(forwarder.forward("x").is_err());
    }
}
