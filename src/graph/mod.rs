//! Microsoft Graph adapter: token acquisition, directory listing, mail send.
//!
//! The orchestrator only sees the [`Authenticator`], [`DirectoryClient`] and
//! [`MailSender`] seams; [`GraphClient`] implements all three over a blocking
//! HTTP client.

pub mod auth;
pub mod directory;
pub mod mail;
pub mod wire;

use crate::constants;
use crate::core::dispatch::MailMessage;
use crate::error::AuditError;
use reqwest::blocking::Client as HttpClient;
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

pub use wire::DirectoryApplication;

/// Bearer token for Graph calls. Never printed.
pub struct AccessToken {
    value: Zeroizing<String>,
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Zeroizing::new(value.into()),
            expires_in: None,
        }
    }

    pub fn secret(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

pub trait Authenticator {
    fn authenticate(&self) -> Result<AccessToken, AuditError>;
}

pub trait DirectoryClient {
    /// Every application registration, in the order the directory returns them.
    fn list_applications(&self, token: &AccessToken)
        -> Result<Vec<DirectoryApplication>, AuditError>;
}

pub trait MailSender {
    /// Send one message as `sender`.
    fn send_mail(
        &self,
        token: &AccessToken,
        sender: &str,
        message: &MailMessage,
    ) -> Result<(), AuditError>;
}

/// Connection settings for [`GraphClient`].
#[derive(Clone)]
pub struct GraphSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub authority_host: String,
    pub graph_base_url: String,
}

pub struct GraphClient {
    http: HttpClient,
    settings: GraphSettings,
}

impl GraphClient {
    pub fn new(settings: GraphSettings) -> reqwest::Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, settings })
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.settings.authority_host.trim_end_matches('/'),
            self.settings.tenant_id
        )
    }

    fn graph_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.settings.graph_base_url.trim_end_matches('/'),
            constants::GRAPH_API_VERSION,
            path.trim_start_matches('/')
        )
    }

    /// `users/<sender>/sendMail`, with the sender percent-encoded as one segment.
    fn send_mail_url(&self, sender: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.graph_url("users")).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|()| "graph base URL cannot carry a path".to_string())?
            .push(sender)
            .push("sendMail");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GraphClient {
        GraphClient::new(GraphSettings {
            tenant_id: "contoso".into(),
            client_id: "cid".into(),
            client_secret: Zeroizing::new("secret".into()),
            authority_host: "https://login.microsoftonline.com/".into(),
            graph_base_url: "https://graph.microsoft.com".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            client().token_url(),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_graph_url() {
        assert_eq!(
            client().graph_url("/users/a@b/sendMail"),
            "https://graph.microsoft.com/v1.0/users/a@b/sendMail"
        );
    }

    #[test]
    fn test_send_mail_url_encodes_sender() {
        assert_eq!(
            client().send_mail_url("noreply@x.com").unwrap().as_str(),
            "https://graph.microsoft.com/v1.0/users/noreply@x.com/sendMail"
        );
        assert_eq!(
            client().send_mail_url("ops#1?a/b@x.com").unwrap().as_str(),
            "https://graph.microsoft.com/v1.0/users/ops%231%3Fa%2Fb@x.com/sendMail"
        );
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("very-secret");
        assert!(!format!("{:?}", token).contains("very-secret"));
        assert_eq!(token.secret(), "very-secret");
    }
}
