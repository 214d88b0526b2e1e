//! Expiration scanning over application snapshots.
//!
//! The scan is a pure function of (applications, warning window, evaluation
//! instant). Records come out in the order the directory presented the
//! applications and their credentials; nothing is re-sorted here.

use crate::constants;
use crate::core::owner;
use crate::models::application::{Application, Credential};
use crate::models::policy::OwnerSource;
use crate::models::record::{ExpiringCredentialRecord, Recipient};
use chrono::{DateTime, Utc};

const UNNAMED_CREDENTIAL: &str = "(unnamed)";

/// Whole days from `now` until `expires_at`, rounded toward negative infinity.
pub fn days_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now)
        .num_seconds()
        .div_euclid(constants::SECONDS_PER_DAY)
}

/// Inside the window: not yet expired and no further out than `warning_days`.
pub fn is_expiring(days_remaining: i64, warning_days: i64) -> bool {
    days_remaining > 0 && days_remaining <= warning_days
}

fn record_for(
    app: &Application,
    credential: &Credential,
    recipient: &Recipient,
    warning_days: i64,
    now: DateTime<Utc>,
) -> Option<ExpiringCredentialRecord> {
    let expires_at = credential.expires_at?;
    let days = days_remaining(expires_at, now);
    if !is_expiring(days, warning_days) {
        return None;
    }
    Some(ExpiringCredentialRecord {
        app_name: app.display_name.clone(),
        app_id: app.app_id.clone(),
        credential_name: credential
            .display_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_CREDENTIAL.to_string()),
        kind: credential.kind,
        expires_at,
        days_remaining: days,
        notify_email: recipient.clone(),
    })
}

/// Expiring records for one application.
///
/// The recipient is resolved once per application and shared by all of its
/// records.
pub fn scan_application(
    app: &Application,
    warning_days: i64,
    now: DateTime<Utc>,
    owner_sources: &[OwnerSource],
) -> Vec<ExpiringCredentialRecord> {
    let recipient = owner::resolve_recipient(app, owner_sources);
    let records: Vec<_> = app
        .credentials
        .iter()
        .filter_map(|c| record_for(app, c, &recipient, warning_days, now))
        .collect();
    if !records.is_empty() {
        tracing::debug!(
            app = %app.display_name,
            app_id = %app.app_id,
            expiring = records.len(),
            recipient = %recipient,
            "application has expiring credentials"
        );
    }
    records
}

/// Expiring records for all applications, in directory order.
pub fn scan(
    apps: &[Application],
    warning_days: i64,
    now: DateTime<Utc>,
    owner_sources: &[OwnerSource],
) -> Vec<ExpiringCredentialRecord> {
    apps.iter()
        .flat_map(|app| scan_application(app, warning_days, now, owner_sources))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::CredentialKind;
    use crate::models::policy::DEFAULT_OWNER_SOURCES;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    fn cred(name: &str, kind: CredentialKind, expires_at: Option<DateTime<Utc>>) -> Credential {
        Credential {
            display_name: Some(name.to_string()),
            kind,
            expires_at,
        }
    }

    fn app(name: &str, notes: Option<&str>, credentials: Vec<Credential>) -> Application {
        Application {
            id: format!("obj-{}", name),
            app_id: format!("app-{}", name),
            display_name: name.to_string(),
            notes: notes.map(String::from),
            info_notes: None,
            credentials,
        }
    }

    #[test]
    fn test_days_remaining_floors() {
        let n = now();
        assert_eq!(days_remaining(n + Duration::days(10), n), 10);
        assert_eq!(days_remaining(n + Duration::hours(36), n), 1);
        assert_eq!(days_remaining(n + Duration::hours(23), n), 0);
        assert_eq!(days_remaining(n - Duration::hours(1), n), -1);
        assert_eq!(days_remaining(n - Duration::days(1), n), -1);
    }

    #[test]
    fn test_is_expiring_bounds() {
        assert!(!is_expiring(0, 30));
        assert!(is_expiring(1, 30));
        assert!(is_expiring(30, 30));
        assert!(!is_expiring(31, 30));
        assert!(!is_expiring(-5, 30));
    }

    #[test]
    fn test_secret_ten_days_out_included() {
        let apps = vec![app(
            "a",
            None,
            vec![cred("s1", CredentialKind::Secret, at(2025, 1, 11))],
        )];
        let records = scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].days_remaining, 10);
        assert_eq!(records[0].kind, CredentialKind::Secret);
        assert_eq!(records[0].notify_email, Recipient::NotDefined);
    }

    #[test]
    fn test_placeholder_tag_yields_no_owner_group() {
        let apps = vec![app(
            "a",
            Some("NotifyEmail=(not defined)"),
            vec![cred("s1", CredentialKind::Secret, at(2025, 1, 11))],
        )];
        let records = scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].notify_email, Recipient::NotDefined);
        assert!(crate::core::grouping::group_by_recipient(&records).is_empty());
    }

    #[test]
    fn test_expired_certificate_excluded() {
        let apps = vec![app(
            "a",
            None,
            vec![cred("c1", CredentialKind::Certificate, at(2024, 12, 31))],
        )];
        assert!(scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES).is_empty());
    }

    #[test]
    fn test_beyond_window_excluded() {
        let apps = vec![app(
            "a",
            None,
            vec![cred("s1", CredentialKind::Secret, at(2025, 3, 1))],
        )];
        assert!(scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES).is_empty());
    }

    #[test]
    fn test_no_expiry_excluded() {
        let apps = vec![app("a", None, vec![cred("s1", CredentialKind::Secret, None)])];
        assert!(scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES).is_empty());
    }

    #[test]
    fn test_predicate_matches_window_for_every_offset() {
        let n = now();
        for offset in -5..=40 {
            let apps = vec![app(
                "a",
                None,
                vec![cred("s", CredentialKind::Secret, Some(n + Duration::days(offset)))],
            )];
            let included = !scan(&apps, 30, n, DEFAULT_OWNER_SOURCES).is_empty();
            assert_eq!(included, offset > 0 && offset <= 30, "offset {}", offset);
        }
    }

    #[test]
    fn test_preserves_directory_order_and_shares_recipient() {
        let apps = vec![
            app(
                "first",
                Some("NotifyEmail=team@x.com;misc=1"),
                vec![
                    cred("cert", CredentialKind::Certificate, at(2025, 1, 20)),
                    cred("secret", CredentialKind::Secret, at(2025, 1, 5)),
                ],
            ),
            app(
                "second",
                None,
                vec![cred("s", CredentialKind::Secret, at(2025, 1, 2))],
            ),
        ];
        let records = scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES);
        let names: Vec<_> = records.iter().map(|r| r.credential_name.as_str()).collect();
        assert_eq!(names, vec!["cert", "secret", "s"]);
        assert_eq!(records[0].notify_email, Recipient::Address("team@x.com".into()));
        assert_eq!(records[1].notify_email, records[0].notify_email);
        assert_eq!(records[2].notify_email, Recipient::NotDefined);
    }

    #[test]
    fn test_unnamed_credential_gets_placeholder() {
        let apps = vec![app(
            "a",
            None,
            vec![Credential {
                display_name: None,
                kind: CredentialKind::Secret,
                expires_at: at(2025, 1, 3),
            }],
        )];
        let records = scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES);
        assert_eq!(records[0].credential_name, "(unnamed)");
    }

    #[test]
    fn test_scan_is_repeatable() {
        let apps = vec![app(
            "a",
            Some("NotifyEmail=a@x"),
            vec![cred("s", CredentialKind::Secret, at(2025, 1, 15))],
        )];
        assert_eq!(
            scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES),
            scan(&apps, 30, now(), DEFAULT_OWNER_SOURCES)
        );
    }
}
