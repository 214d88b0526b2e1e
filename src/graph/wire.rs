//! Graph JSON shapes for application registrations.

use crate::error::AuditError;
use crate::models::application::{Application, Credential, CredentialKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApplicationPage {
    #[serde(default)]
    pub value: Vec<DirectoryApplication>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryApplication {
    pub id: String,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub info: Option<InfoSection>,
    #[serde(default)]
    pub password_credentials: Option<Vec<WireCredential>>,
    #[serde(default)]
    pub key_credentials: Option<Vec<WireCredential>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoSection {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCredential {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
}

impl DirectoryApplication {
    /// Best available label for logs and error messages.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.app_id.as_deref())
            .unwrap_or(&self.id)
    }
}

fn parse_end(value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| format!("invalid endDateTime '{}': {}", raw, e)),
    }
}

fn convert_credentials(
    wire: Option<&Vec<WireCredential>>,
    kind: CredentialKind,
    out: &mut Vec<Credential>,
) -> Result<(), String> {
    for c in wire.into_iter().flatten() {
        out.push(Credential {
            display_name: c.display_name.clone(),
            kind,
            expires_at: parse_end(c.end_date_time.as_deref())?,
        });
    }
    Ok(())
}

impl TryFrom<&DirectoryApplication> for Application {
    type Error = AuditError;

    fn try_from(raw: &DirectoryApplication) -> Result<Self, Self::Error> {
        let fail = |reason: String| AuditError::Application {
            app_name: raw.label().to_string(),
            app_id: raw.app_id.clone().unwrap_or_else(|| raw.id.clone()),
            reason,
        };

        let app_id = raw
            .app_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| fail("missing appId".to_string()))?;

        let mut credentials = Vec::new();
        convert_credentials(
            raw.password_credentials.as_ref(),
            CredentialKind::Secret,
            &mut credentials,
        )
        .map_err(fail)?;
        convert_credentials(
            raw.key_credentials.as_ref(),
            CredentialKind::Certificate,
            &mut credentials,
        )
        .map_err(fail)?;

        Ok(Application {
            id: raw.id.clone(),
            display_name: raw.display_name.clone().unwrap_or_else(|| app_id.clone()),
            app_id,
            notes: raw.notes.clone(),
            info_notes: raw.info.as_ref().and_then(|i| i.notes.clone()),
            credentials,
        })
    }
}
