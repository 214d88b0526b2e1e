//! Owner-tag resolution from application metadata.
//!
//! Owners opt into alerts by writing `NotifyEmail=<address>` into an
//! application's notes. The value ends at whitespace or `;`, so the tag can
//! share the field with unrelated text (`NotifyEmail=team@x.com;cost=42`).

use crate::constants;
use crate::models::application::Application;
use crate::models::policy::OwnerSource;
use crate::models::record::Recipient;
use regex::Regex;
use std::sync::LazyLock;

static NOTIFY_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)NotifyEmail\s*=\s*([^\s;]+)").unwrap());

/// Extract the first `NotifyEmail=` value from free text.
///
/// Case-insensitive. No address validation is done: any captured token is
/// returned as-is.
pub fn parse_notify_email(text: &str) -> Option<&str> {
    NOTIFY_EMAIL_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn source_text<'a>(app: &'a Application, source: OwnerSource) -> Option<&'a str> {
    match source {
        OwnerSource::InfoNotes => app.info_notes.as_deref(),
        OwnerSource::Notes => app.notes.as_deref(),
    }
}

/// Resolve the recipient for an application by querying `sources` in order.
///
/// The first source whose text yields a tag wins. Absent fields, fields
/// without a tag, and a tag whose value is the `(not defined)` placeholder
/// fall through; when nothing matches the result is [`Recipient::NotDefined`].
pub fn resolve_recipient(app: &Application, sources: &[OwnerSource]) -> Recipient {
    for source in sources {
        let Some(value) = source_text(app, *source).and_then(parse_notify_email) else {
            continue;
        };
        if value == constants::RECIPIENT_NOT_DEFINED {
            tracing::debug!(app = %app.display_name, source = source.label(), "owner tag holds the placeholder, ignored");
            continue;
        }
        tracing::trace!(app = %app.display_name, source = source.label(), "owner tag resolved");
        return Recipient::Address(value.to_string());
    }
    Recipient::NotDefined
}
