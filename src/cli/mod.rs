//! CLI routing and command dispatch.

use crate::core::config::{self, SettingsInput};
use crate::models::config_file::ConfigFile;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod audit;
pub mod doctor;
pub mod scan;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub config_path: Option<PathBuf>,
    pub config: ConfigFile,
}

#[derive(Parser, Debug)]
#[command(
    name = "appcred-watch",
    version,
    about = "Audit app registration secrets and certificates for upcoming expiry"
)]
pub struct Cli {
    /// Config file (default: $APPCRED_WATCH_CONFIG or ./appcred-watch.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config_path = config::config_path(self.config);
        let config = match &config_path {
            Some(path) => config::load(path)?,
            None => ConfigFile::default(),
        };
        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "loaded config file");
        }

        let ctx = CliContext {
            config_path,
            config,
        };

        match self.command {
            Commands::Audit(args) => audit::run(&ctx, args),
            Commands::Scan(args) => scan::run(&ctx, args),
            Commands::Doctor(args) => doctor::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan, report, and notify (or write the report locally with --local)
    Audit(audit::AuditArgs),
    /// List expiring credentials without writing or sending anything
    Scan(scan::ScanArgs),
    /// Check configuration without contacting the directory (safe, read-only)
    Doctor(doctor::DoctorArgs),
}

/// Tenant connection and scan window, shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Application (client) id used to sign in
    #[arg(long, env = "APPCRED_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret used to sign in
    #[arg(long, env = "APPCRED_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Directory (tenant) id
    #[arg(long, env = "APPCRED_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Warning window in days (default: 30)
    #[arg(long, env = "APPCRED_WARNING_DAYS")]
    pub warning_days: Option<i64>,
}

impl ConnectionArgs {
    pub fn settings_input(&self) -> SettingsInput {
        SettingsInput {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            tenant_id: self.tenant_id.clone(),
            warning_days: self.warning_days,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_audit_flags() {
        let cli = Cli::try_parse_from([
            "appcred-watch",
            "audit",
            "--client-id",
            "cid",
            "--tenant-id",
            "tid",
            "--local",
            "--output",
            "report.html",
            "--on-app-error",
            "isolate",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit(args) => {
                assert!(args.local);
                assert_eq!(args.connection.client_id.as_deref(), Some("cid"));
                assert_eq!(args.output, Some(PathBuf::from("report.html")));
                assert_eq!(
                    args.on_app_error,
                    Some(crate::models::policy::FailureMode::Isolate)
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
