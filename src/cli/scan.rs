use crate::cli::{CliContext, ConnectionArgs};
use crate::core::config;
use crate::core::orchestrator::Orchestrator;
use crate::graph::{Authenticator, DirectoryClient, GraphClient};
use crate::models::record::ExpiringCredentialRecord;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Directory order
    Scan,
    /// Soonest expiry first
    Days,
    /// Application name
    App,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Row order
    #[arg(long, value_enum, default_value_t = SortKey::Scan)]
    pub sort: SortKey,
}

/// Reorder a copy of the records for display; the scan order itself is untouched.
pub fn sorted(records: &[ExpiringCredentialRecord], key: SortKey) -> Vec<ExpiringCredentialRecord> {
    let mut out = records.to_vec();
    match key {
        SortKey::Scan => {}
        SortKey::Days => out.sort_by_key(|r| r.days_remaining),
        SortKey::App => out.sort_by(|a, b| {
            a.app_name
                .to_lowercase()
                .cmp(&b.app_name.to_lowercase())
                .then_with(|| a.credential_name.cmp(&b.credential_name))
        }),
    }
    out
}

pub fn records_table(records: &[ExpiringCredentialRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("App Name").add_attribute(Attribute::Bold),
        Cell::new("App ID").add_attribute(Attribute::Bold),
        Cell::new("Credential").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Days").add_attribute(Attribute::Bold),
        Cell::new("Expires").add_attribute(Attribute::Bold),
        Cell::new("NotifyEmail").add_attribute(Attribute::Bold),
    ]);
    for r in records {
        table.add_row(vec![
            r.app_name.clone(),
            r.app_id.clone(),
            r.credential_name.clone(),
            r.kind.to_string(),
            r.days_remaining.to_string(),
            r.expires_at.format("%Y-%m-%d").to_string(),
            r.notify_email.to_string(),
        ]);
    }
    table
}

pub fn run(ctx: &CliContext, args: ScanArgs) -> Result<()> {
    let mut input = args.connection.settings_input();
    input.local = true;
    let settings = config::resolve(&input, &ctx.config)?;

    let client = GraphClient::new(settings.graph.clone()).context("build HTTP client")?;
    let now = Utc::now();
    let token = client.authenticate()?;
    let raw = client.list_applications(&token)?;
    let orchestrator = Orchestrator::new(&settings.run, &client, &client, &client);
    let outcome = orchestrator.scan_phase(&raw, now)?;
    let records = sorted(&outcome.records, args.sort);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records).context("serialize records")?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!(
                    "No credentials expire within the next {} days.",
                    settings.run.warning_days
                );
            } else {
                println!("{}", records_table(&records));
                println!(
                    "\n{} expiring credential(s) across {} application(s).",
                    records.len(),
                    raw.len()
                );
            }
            for s in &outcome.skipped {
                println!("  [WARN] skipped {} ({}): {}", s.app_name, s.app_id, s.reason);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::CredentialKind;
    use crate::models::record::Recipient;
    use chrono::TimeZone;

    fn record(app: &str, days: i64) -> ExpiringCredentialRecord {
        ExpiringCredentialRecord {
            app_name: app.into(),
            app_id: "id".into(),
            credential_name: "s".into(),
            kind: CredentialKind::Secret,
            expires_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            days_remaining: days,
            notify_email: Recipient::NotDefined,
        }
    }

    #[test]
    fn test_sorted_by_days() {
        let records = vec![record("b", 20), record("a", 3), record("c", 9)];
        let days: Vec<_> = sorted(&records, SortKey::Days)
            .iter()
            .map(|r| r.days_remaining)
            .collect();
        assert_eq!(days, vec![3, 9, 20]);
        assert_eq!(records[0].app_name, "b");
    }

    #[test]
    fn test_sorted_by_app_is_case_insensitive() {
        let records = vec![record("beta", 1), record("Alpha", 2)];
        let names: Vec<_> = sorted(&records, SortKey::App)
            .into_iter()
            .map(|r| r.app_name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_scan_order_untouched() {
        let records = vec![record("b", 20), record("a", 3)];
        assert_eq!(sorted(&records, SortKey::Scan), records);
    }

    #[test]
    fn test_table_has_a_row_per_record() {
        let table = records_table(&[record("a", 3), record("b", 4)]);
        assert_eq!(table.row_iter().count(), 2);
    }
}
