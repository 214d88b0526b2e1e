//! On-disk configuration file model (`appcred-watch.toml`).

use crate::models::policy::{OwnerSource, PolicySection};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub tenant: TenantSection,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub mail: MailSection,
    #[serde(default)]
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantSection {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub authority_host: Option<String>,
    #[serde(default)]
    pub graph_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSection {
    #[serde(default)]
    pub warning_days: Option<i64>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub local: Option<bool>,
    /// Ordered metadata fields searched for the owner tag.
    #[serde(default)]
    pub owner_sources: Option<Vec<OwnerSource>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailSection {
    #[serde(default)]
    pub sender_address: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
}
