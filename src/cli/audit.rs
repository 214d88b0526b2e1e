use crate::cli::scan::records_table;
use crate::cli::{CliContext, ConnectionArgs};
use crate::constants;
use crate::core::config;
use crate::core::orchestrator::{Orchestrator, RunSummary};
use crate::graph::GraphClient;
use crate::models::policy::FailureMode;
use crate::util::journald::{self, JournalForwarder};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Mailbox the notifications are sent from
    #[arg(long, env = "APPCRED_SENDER", value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Recipient of the consolidated administrator report
    #[arg(long, env = "APPCRED_ADMIN_EMAIL", value_name = "ADDRESS")]
    pub admin_email: Option<String>,

    /// Also write the administrator report to this HTML file
    #[arg(long, env = "APPCRED_OUTPUT", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Local execution: write the report file only, send no mail
    #[arg(long, env = "APPCRED_LOCAL")]
    pub local: bool,

    /// What a malformed application does to the run
    #[arg(long, value_enum, value_name = "MODE")]
    pub on_app_error: Option<FailureMode>,

    /// What a failed mail send does to the run
    #[arg(long, value_enum, value_name = "MODE")]
    pub on_send_error: Option<FailureMode>,
}

pub fn run(ctx: &CliContext, args: AuditArgs) -> Result<()> {
    let mut input = args.connection.settings_input();
    input.sender_address = args.sender;
    input.admin_email = args.admin_email;
    input.output_path = args.output;
    input.local = args.local;
    input.on_application_error = args.on_app_error;
    input.on_dispatch_error = args.on_send_error;

    let settings = config::resolve(&input, &ctx.config)?;
    let mode = if settings.run.mode.is_local() {
        "local"
    } else {
        "remote"
    };
    tracing::info!(
        mode,
        warning_days = settings.run.warning_days,
        on_app_error = %settings.run.failure_policy.on_application_error,
        on_send_error = %settings.run.failure_policy.on_dispatch_error,
        "starting audit run"
    );

    let client = GraphClient::new(settings.graph.clone()).context("build HTTP client")?;
    let orchestrator = Orchestrator::new(&settings.run, &client, &client, &client);
    let summary = orchestrator.run(Utc::now())?;

    print_summary(&summary);

    if settings.journald_summary {
        journald::forward_summary(&JournalForwarder::systemd_cat(constants::JOURNALD_TAG), &summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.scan.records.is_empty() {
        println!("No expiring credentials found.");
    } else {
        println!("{}", records_table(&summary.scan.records));
    }

    println!();
    println!(
        "Audit: {} application(s), {} expiring credential(s), {} owner group(s)",
        summary.applications, summary.expiring, summary.owner_groups
    );
    for s in &summary.skipped {
        println!("  [WARN] skipped {} ({}): {}", s.app_name, s.app_id, s.reason);
    }
    match (&summary.report_path, &summary.report_write_error) {
        (Some(path), _) => println!("  [PASS] report written: {}", path.display()),
        (None, Some(err)) => println!("  [WARN] report not written: {}", err),
        (None, None) => {}
    }
    if let Some(dispatch) = &summary.dispatch {
        println!(
            "  [INFO] mail: {} attempted, {} delivered, {} failed",
            dispatch.attempted,
            dispatch.delivered.len(),
            dispatch.failed.len()
        );
        for f in &dispatch.failed {
            println!("  [FAIL] {}: {}", f.recipient, f.reason);
        }
    } else if summary.local {
        println!("  [INFO] local mode: no mail sent");
    }
}
