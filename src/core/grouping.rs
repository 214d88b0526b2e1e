//! Per-owner grouping of expiring records.

use crate::models::record::{ExpiringCredentialRecord, NotificationGroup};
use std::collections::HashMap;

/// Group records by resolved recipient, skipping the sentinel.
///
/// Groups are ordered by the first appearance of their recipient; records
/// inside a group keep scan order.
pub fn group_by_recipient(records: &[ExpiringCredentialRecord]) -> Vec<NotificationGroup> {
    let mut groups: Vec<NotificationGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(addr) = record.notify_email.address() else {
            continue;
        };
        match index.get(addr) {
            Some(&i) => groups[i].records.push(record.clone()),
            None => {
                index.insert(addr, groups.len());
                groups.push(NotificationGroup {
                    recipient: addr.to_string(),
                    records: vec![record.clone()],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::CredentialKind;
    use crate::models::record::Recipient;
    use chrono::{TimeZone, Utc};

    fn record(app: &str, cred: &str, recipient: Recipient) -> ExpiringCredentialRecord {
        ExpiringCredentialRecord {
            app_name: app.into(),
            app_id: format!("id-{}", app),
            credential_name: cred.into(),
            kind: CredentialKind::Secret,
            expires_at: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
            days_remaining: 9,
            notify_email: recipient,
        }
    }

    #[test]
    fn test_shared_recipient_forms_one_group() {
        let team = Recipient::Address("team@x.com".into());
        let records = vec![
            record("a", "s1", team.clone()),
            record("b", "s2", Recipient::Address("other@x.com".into())),
            record("c", "s3", team.clone()),
        ];
        let groups = group_by_recipient(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].recipient, "team@x.com");
        let names: Vec<_> = groups[0].records.iter().map(|r| r.app_name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(groups[1].recipient, "other@x.com");
    }

    #[test]
    fn test_sentinel_is_never_grouped() {
        let records = vec![
            record("a", "s1", Recipient::NotDefined),
            record("b", "s2", Recipient::NotDefined),
        ];
        assert!(group_by_recipient(&records).is_empty());
    }

    #[test]
    fn test_placeholder_text_is_never_grouped() {
        let records = vec![record("a", "s1", Recipient::Address("(not defined)".into()))];
        assert!(group_by_recipient(&records).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_recipient(&[]).is_empty());
    }
}
