//! Configuration loading and resolution.
//!
//! Values come from CLI flags (with env fallbacks handled by clap), then the
//! optional TOML file, then defaults. Resolution reports every missing
//! required field at once.

use crate::constants;
use crate::error::ConfigError;
use crate::graph::GraphSettings;
use crate::models::config_file::ConfigFile;
use crate::models::policy::{FailureMode, FailurePolicy, OwnerSource, DEFAULT_OWNER_SOURCES};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Locate the config file: explicit path, then env var, then the working directory.
pub fn config_path(arg: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = arg {
        return Some(path);
    }
    if let Ok(path) = env::var(constants::CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let local = PathBuf::from(constants::DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    None
}

pub fn load(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let file: ConfigFile =
        toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
    Ok(file)
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsInput {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    pub warning_days: Option<i64>,
    pub sender_address: Option<String>,
    pub admin_email: Option<String>,
    pub output_path: Option<PathBuf>,
    pub local: bool,
    pub on_application_error: Option<FailureMode>,
    pub on_dispatch_error: Option<FailureMode>,
}

/// Where the run delivers its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// File output only, no mail.
    Local,
    /// Admin report and owner alerts are mailed.
    Remote {
        sender_address: String,
        admin_email: String,
    },
}

impl RunMode {
    pub fn is_local(&self) -> bool {
        matches!(self, RunMode::Local)
    }
}

/// Everything that shapes one audit run besides the Graph connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub warning_days: i64,
    pub mode: RunMode,
    pub output_path: Option<PathBuf>,
    pub owner_sources: Vec<OwnerSource>,
    pub failure_policy: FailurePolicy,
}

pub struct AuditSettings {
    pub graph: GraphSettings,
    pub run: RunOptions,
    pub journald_summary: bool,
}

fn pick(cli: &Option<String>, file: &Option<String>) -> Option<String> {
    cli.as_ref()
        .or(file.as_ref())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether the merged inputs select local mode.
pub fn is_local(input: &SettingsInput, file: &ConfigFile) -> bool {
    input.local || file.audit.local.unwrap_or(false)
}

/// Names of required fields absent from both CLI/env and file.
///
/// Tenant credentials are always required; sender and admin addresses only
/// outside local mode.
pub fn missing_fields(input: &SettingsInput, file: &ConfigFile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    let required = [
        ("client_id", pick(&input.client_id, &file.tenant.client_id)),
        ("client_secret", pick(&input.client_secret, &file.tenant.client_secret)),
        ("tenant_id", pick(&input.tenant_id, &file.tenant.tenant_id)),
    ];
    for (name, value) in &required {
        if value.is_none() {
            missing.push(*name);
        }
    }
    if !is_local(input, file) {
        if pick(&input.sender_address, &file.mail.sender_address).is_none() {
            missing.push("sender_address");
        }
        if pick(&input.admin_email, &file.mail.admin_email).is_none() {
            missing.push("admin_email");
        }
    }
    missing
}

/// Merge CLI/env input with the config file into validated settings.
pub fn resolve(input: &SettingsInput, file: &ConfigFile) -> Result<AuditSettings, ConfigError> {
    let missing = missing_fields(input, file);
    if !missing.is_empty() {
        return Err(ConfigError::Missing(missing));
    }

    let warning_days = input
        .warning_days
        .or(file.audit.warning_days)
        .unwrap_or(constants::DEFAULT_WARNING_DAYS);
    if warning_days < 1 {
        return Err(ConfigError::Invalid {
            field: "warning_days",
            reason: format!("must be at least 1, got {}", warning_days),
        });
    }

    let owner_sources = file
        .audit
        .owner_sources
        .clone()
        .unwrap_or_else(|| DEFAULT_OWNER_SOURCES.to_vec());
    if owner_sources.is_empty() {
        return Err(ConfigError::Invalid {
            field: "owner_sources",
            reason: "at least one source is required".to_string(),
        });
    }

    let mode = if is_local(input, file) {
        RunMode::Local
    } else {
        RunMode::Remote {
            sender_address: pick(&input.sender_address, &file.mail.sender_address)
                .unwrap_or_default(),
            admin_email: pick(&input.admin_email, &file.mail.admin_email).unwrap_or_default(),
        }
    };

    let graph = GraphSettings {
        tenant_id: pick(&input.tenant_id, &file.tenant.tenant_id).unwrap_or_default(),
        client_id: pick(&input.client_id, &file.tenant.client_id).unwrap_or_default(),
        client_secret: Zeroizing::new(
            pick(&input.client_secret, &file.tenant.client_secret).unwrap_or_default(),
        ),
        authority_host: file
            .tenant
            .authority_host
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_AUTHORITY_HOST.to_string()),
        graph_base_url: file
            .tenant
            .graph_base_url
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_GRAPH_BASE_URL.to_string()),
    };

    Ok(AuditSettings {
        graph,
        run: RunOptions {
            warning_days,
            mode,
            output_path: input.output_path.clone().or(file.audit.output_path.clone()),
            owner_sources,
            failure_policy: FailurePolicy {
                on_application_error: input
                    .on_application_error
                    .unwrap_or(file.policy.on_application_error),
                on_dispatch_error: input
                    .on_dispatch_error
                    .unwrap_or(file.policy.on_dispatch_error),
            },
        },
        journald_summary: file.policy.journald_summary,
    })
}
