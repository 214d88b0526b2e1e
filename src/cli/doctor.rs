//! Configuration diagnostics. Never contacts the directory.

use crate::cli::{CliContext, ConnectionArgs};
use crate::core::config::{self, RunMode};
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Mailbox the notifications are sent from
    #[arg(long, env = "APPCRED_SENDER", value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Recipient of the consolidated administrator report
    #[arg(long, env = "APPCRED_ADMIN_EMAIL", value_name = "ADDRESS")]
    pub admin_email: Option<String>,

    /// Check as for local execution (mail settings not required)
    #[arg(long, env = "APPCRED_LOCAL")]
    pub local: bool,
}

pub fn run(ctx: &CliContext, args: DoctorArgs) -> Result<()> {
    let mut input = args.connection.settings_input();
    input.sender_address = args.sender;
    input.admin_email = args.admin_email;
    input.local = args.local;

    let mut ok = 0u32;
    let mut fail = 0u32;

    match &ctx.config_path {
        Some(path) => println!("Doctor: config {}", path.display()),
        None => println!("Doctor: no config file (flags and environment only)"),
    }

    let missing = config::missing_fields(&input, &ctx.config);
    let local = config::is_local(&input, &ctx.config);
    let mut fields = vec!["client_id", "client_secret", "tenant_id"];
    if !local {
        fields.extend(["sender_address", "admin_email"]);
    }
    for field in fields {
        if missing.contains(&field) {
            println!("  [FAIL] {} not set", field);
            fail += 1;
        } else {
            println!("  [PASS] {} set", field);
            ok += 1;
        }
    }

    if missing.is_empty() {
        match config::resolve(&input, &ctx.config) {
            Ok(settings) => {
                let mode = match &settings.run.mode {
                    RunMode::Local => "local (file output only)".to_string(),
                    RunMode::Remote {
                        sender_address,
                        admin_email,
                    } => format!("remote (send as {} to {})", sender_address, admin_email),
                };
                println!("  [INFO] mode: {}", mode);
                println!("  [INFO] warning window: {} days", settings.run.warning_days);
                let sources: Vec<_> = settings.run.owner_sources.iter().map(|s| s.label()).collect();
                println!("  [INFO] owner tag sources: {}", sources.join(" -> "));
                println!(
                    "  [INFO] on application error: {}, on send error: {}",
                    settings.run.failure_policy.on_application_error,
                    settings.run.failure_policy.on_dispatch_error
                );
                match &settings.run.output_path {
                    Some(p) => println!("  [INFO] report file: {}", p.display()),
                    None if settings.run.mode.is_local() => {
                        println!("  [WARN] local mode without an output path: report will not be saved")
                    }
                    None => {}
                }
            }
            Err(e) => {
                println!("  [FAIL] {}", e);
                fail += 1;
            }
        }
    }

    println!();
    println!("Doctor summary: {} pass, {} fail", ok, fail);
    if fail > 0 {
        std::process::exit(1);
    }
    Ok(())
}
