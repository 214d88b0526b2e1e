//! `sendMail` on behalf of the configured sender.

use crate::core::dispatch::MailMessage;
use crate::error::AuditError;
use crate::graph::{AccessToken, GraphClient, MailSender};

impl MailSender for GraphClient {
    fn send_mail(
        &self,
        token: &AccessToken,
        sender: &str,
        message: &MailMessage,
    ) -> Result<(), AuditError> {
        let dispatch_err = |reason: String| AuditError::Dispatch {
            recipient: message.recipient().to_string(),
            reason,
        };
        let url = self.send_mail_url(sender).map_err(dispatch_err)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token.secret())
            .json(message)
            .send()
            .map_err(|err| dispatch_err(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(dispatch_err(format!("sendMail returned {}: {}", status, body)));
        }
        Ok(())
    }
}
