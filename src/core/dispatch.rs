//! Mail dispatch of the administrator report and per-owner alerts.

use crate::core::report;
use crate::error::AuditError;
use crate::graph::{AccessToken, MailSender};
use crate::models::policy::FailureMode;
use crate::models::record::{ExpiringCredentialRecord, NotificationGroup};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `sendMail` request body: one HTML message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub message: MessageEnvelope,
    pub save_to_sent_items: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    pub subject: String,
    pub body: MessageBody,
    pub to_recipients: Vec<MailRecipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub address: String,
}

impl MailMessage {
    pub fn html(recipient: &str, subject: &str, html_body: &str) -> Self {
        Self {
            message: MessageEnvelope {
                subject: subject.to_string(),
                body: MessageBody {
                    content_type: "HTML".to_string(),
                    content: html_body.to_string(),
                },
                to_recipients: vec![MailRecipient {
                    email_address: EmailAddress {
                        address: recipient.to_string(),
                    },
                }],
            },
            save_to_sent_items: false,
        }
    }

    pub fn recipient(&self) -> &str {
        self.message
            .to_recipients
            .first()
            .map(|r| r.email_address.address.as_str())
            .unwrap_or("")
    }
}

pub fn admin_subject(record_count: usize, warning_days: i64) -> String {
    format!(
        "App registration credentials expiring within {} days ({} found)",
        warning_days, record_count
    )
}

pub fn owner_subject(record_count: usize) -> String {
    format!(
        "Action required: {} app credential(s) expiring soon",
        record_count
    )
}

/// The administrator's copy of the full report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminReport {
    pub recipient: String,
    pub subject: String,
    pub html: String,
}

impl AdminReport {
    pub fn new(
        recipient: &str,
        records: &[ExpiringCredentialRecord],
        warning_days: i64,
        html: String,
    ) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: admin_subject(records.len(), warning_days),
            html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub recipient: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub delivered: Vec<String>,
    pub failed: Vec<DispatchFailure>,
}

/// Sends rendered content through a [`MailSender`] as a fixed sender identity.
pub struct NotificationDispatcher<'a> {
    mailer: &'a dyn MailSender,
    token: &'a AccessToken,
    sender: &'a str,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(mailer: &'a dyn MailSender, token: &'a AccessToken, sender: &'a str) -> Self {
        Self {
            mailer,
            token,
            sender,
        }
    }

    /// One mail-send call carrying `html_body` to `recipient`.
    pub fn send_report(
        &self,
        recipient: &str,
        html_body: &str,
        subject: &str,
    ) -> Result<(), AuditError> {
        let message = MailMessage::html(recipient, subject, html_body);
        self.mailer.send_mail(self.token, self.sender, &message)?;
        tracing::info!(recipient, subject, "mail sent");
        Ok(())
    }

    /// Admin report first, then one alert per owner group, in order.
    ///
    /// Under [`FailureMode::Abort`] the first failed send is returned and the
    /// remaining sends are not attempted; earlier sends stay sent. Under
    /// [`FailureMode::Isolate`] failures are collected into the summary.
    pub fn dispatch_all(
        &self,
        admin: &AdminReport,
        groups: &[NotificationGroup],
        generated_at: DateTime<Utc>,
        mode: FailureMode,
    ) -> Result<DispatchSummary, AuditError> {
        let mut summary = DispatchSummary::default();

        let mut outgoing: Vec<(String, String, String)> =
            Vec::with_capacity(1 + groups.len());
        outgoing.push((
            admin.recipient.clone(),
            admin.subject.clone(),
            admin.html.clone(),
        ));
        for group in groups {
            outgoing.push((
                group.recipient.clone(),
                owner_subject(group.records.len()),
                report::render_owner_alert(&group.records, generated_at),
            ));
        }

        for (recipient, subject, body) in &outgoing {
            summary.attempted += 1;
            match self.send_report(recipient, body, subject) {
                Ok(()) => summary.delivered.push(recipient.clone()),
                Err(e) => match mode {
                    FailureMode::Abort => {
                        tracing::error!(recipient = %recipient, error = %e, "mail send failed, aborting remaining sends");
                        return Err(e);
                    }
                    FailureMode::Isolate => {
                        tracing::warn!(recipient = %recipient, error = %e, "mail send failed, continuing");
                        summary.failed.push(DispatchFailure {
                            recipient: recipient.clone(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(summary)
    }
}
