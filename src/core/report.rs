//! HTML rendering of expiring-credential records.
//!
//! Two views: the administrator report (every record, portal links, owner
//! column) and the owner alert (only that owner's records, no links). Both are
//! pure functions of their input and the generation timestamp.

use crate::constants;
use crate::models::record::ExpiringCredentialRecord;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const STYLE: &str = r#"    <style>
        body { font-family: 'Segoe UI', Arial, sans-serif; color: #333; margin: 20px; }
        h1 { color: #2c3e50; font-size: 22px; margin-bottom: 4px; }
        .meta { color: #7f8c8d; margin-bottom: 16px; }
        .notice { background: #fff4e5; border-left: 4px solid #f39c12; padding: 10px 14px; margin-bottom: 16px; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 8px 10px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background: #34495e; color: white; }
        th.sortable { cursor: pointer; }
        tr:hover { background: #f8f9fa; }
        .days-critical { color: #c0392b; font-weight: bold; }
        .days-warning { color: #e67e22; font-weight: bold; }
        .empty { text-align: center; color: #7f8c8d; }
    </style>
"#;

const SORT_SCRIPT: &str = r#"    <script>
        function sortTable(col) {
            var table = document.getElementById('credentials');
            var body = table.tBodies[0];
            var rows = Array.prototype.slice.call(body.rows);
            var asc = table.getAttribute('data-sort-col') != String(col) || table.getAttribute('data-sort-dir') != 'asc';
            rows.sort(function (a, b) {
                var x = a.cells[col].getAttribute('data-sort') || a.cells[col].textContent;
                var y = b.cells[col].getAttribute('data-sort') || b.cells[col].textContent;
                var nx = parseFloat(x), ny = parseFloat(y);
                var cmp = (!isNaN(nx) && !isNaN(ny)) ? nx - ny : x.localeCompare(y);
                return asc ? cmp : -cmp;
            });
            rows.forEach(function (r) { body.appendChild(r); });
            table.setAttribute('data-sort-col', String(col));
            table.setAttribute('data-sort-dir', asc ? 'asc' : 'desc');
        }
    </script>
"#;

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Portal deep link to the credentials blade of an application.
pub fn portal_credentials_link(app_id: &str) -> String {
    format!("{}{}", constants::PORTAL_CREDENTIALS_BLADE, app_id)
}

fn days_class(days: i64) -> &'static str {
    if days <= 7 {
        "days-critical"
    } else {
        "days-warning"
    }
}

fn days_cell(days: i64) -> String {
    format!(
        "<td class=\"{}\" data-sort=\"{}\">{} days</td>",
        days_class(days),
        days,
        days
    )
}

fn document(title: &str, generated_at: DateTime<Utc>, preamble: &str, table: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n{STYLE}{SORT_SCRIPT}</head>\n<body>\n    <h1>{title}</h1>\n    <div class=\"meta\">Generated: {generated}</div>\n{preamble}{table}</body>\n</html>\n",
        title = escape_html(title),
        generated = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn table(headers: &[&str], rows: &str, empty_message: &str) -> String {
    let mut out = String::from("    <table id=\"credentials\">\n        <thead><tr>");
    for (i, h) in headers.iter().enumerate() {
        let _ = write!(
            out,
            "<th class=\"sortable\" onclick=\"sortTable({})\">{}</th>",
            i,
            escape_html(h)
        );
    }
    out.push_str("</tr></thead>\n        <tbody>\n");
    if rows.is_empty() {
        let _ = writeln!(
            out,
            "            <tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>",
            headers.len(),
            escape_html(empty_message)
        );
    } else {
        out.push_str(rows);
    }
    out.push_str("        </tbody>\n    </table>\n");
    out
}

/// Full administrator report over every record.
pub fn render_admin_report(
    records: &[ExpiringCredentialRecord],
    generated_at: DateTime<Utc>,
    warning_days: i64,
) -> String {
    let mut rows = String::new();
    for r in records {
        let _ = writeln!(
            rows,
            "            <tr><td>{}</td><td>{}</td><td><a href=\"{}\">{}</a></td><td>{}</td>{}<td>{}</td><td>{}</td></tr>",
            escape_html(&r.app_name),
            escape_html(&r.app_id),
            escape_html(&portal_credentials_link(&r.app_id)),
            escape_html(&r.credential_name),
            r.kind,
            days_cell(r.days_remaining),
            r.expires_at.format("%Y-%m-%d"),
            escape_html(r.notify_email.as_str()),
        );
    }

    let preamble = format!(
        "    <p>{} credential(s) expire within the next {} days.</p>\n",
        records.len(),
        warning_days
    );
    let body = table(
        &[
            "App Name",
            "App ID",
            "Credential Name",
            "Type",
            "Days Remaining",
            "Expires",
            "NotifyEmail",
        ],
        &rows,
        "No expiring credentials found.",
    );
    document(
        "App Registration Credential Expiry Report",
        generated_at,
        &preamble,
        &body,
    )
}

/// Owner-facing alert: no portal links, no recipient column.
pub fn render_owner_alert(
    records: &[ExpiringCredentialRecord],
    generated_at: DateTime<Utc>,
) -> String {
    let mut rows = String::new();
    for r in records {
        let _ = writeln!(
            rows,
            "            <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}<td>{}</td></tr>",
            escape_html(&r.app_name),
            escape_html(&r.app_id),
            escape_html(&r.credential_name),
            r.kind,
            days_cell(r.days_remaining),
            r.expires_at.format("%Y-%m-%d"),
        );
    }

    let preamble = "    <div class=\"notice\">The credentials below belong to applications you are listed as owner of and will expire soon. Please contact your administrator to renew them before they expire.</div>\n";
    let body = table(
        &[
            "App Name",
            "App ID",
            "Credential Name",
            "Type",
            "Days Remaining",
            "Expires",
        ],
        &rows,
        "No expiring credentials found.",
    );
    document("Owner Alert: Expiring App Credentials", generated_at, preamble, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::CredentialKind;
    use crate::models::record::Recipient;
    use chrono::TimeZone;

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap()
    }

    fn records() -> Vec<ExpiringCredentialRecord> {
        vec![
            ExpiringCredentialRecord {
                app_name: "billing <api>".into(),
                app_id: "11111111-2222".into(),
                credential_name: "prod secret".into(),
                kind: CredentialKind::Secret,
                expires_at: Utc.with_ymd_and_hms(2025, 1, 11, 0, 0, 0).unwrap(),
                days_remaining: 10,
                notify_email: Recipient::Address("team@x.com".into()),
            },
            ExpiringCredentialRecord {
                app_name: "portal".into(),
                app_id: "3333".into(),
                credential_name: "signing".into(),
                kind: CredentialKind::Certificate,
                expires_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
                days_remaining: 1,
                notify_email: Recipient::NotDefined,
            },
        ]
    }

    #[test]
    fn test_admin_report_is_deterministic() {
        let a = render_admin_report(&records(), generated(), 30);
        let b = render_admin_report(&records(), generated(), 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_admin_report_contents() {
        let html = render_admin_report(&records(), generated(), 30);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Generated: 2025-01-01 08:30:00 UTC"));
        assert!(html.contains("billing &lt;api&gt;"));
        assert!(html.contains(
            "href=\"https://portal.azure.com/#view/Microsoft_AAD_RegisteredApps/ApplicationMenuBlade/~/Credentials/appId/11111111-2222\""
        ));
        assert!(html.contains(">10 days</td>"));
        assert!(html.contains(">1 days</td>"));
        assert!(!html.contains(">1 day</td>"));
        assert!(html.contains("<td>2025-01-11</td>"));
        assert!(html.contains("<td>team@x.com</td>"));
        assert!(html.contains("<td>(not defined)</td>"));
        assert!(html.contains("<th class=\"sortable\" onclick=\"sortTable(6)\">NotifyEmail</th>"));
    }

    #[test]
    fn test_admin_report_keeps_record_order() {
        let html = render_admin_report(&records(), generated(), 30);
        let first = html.find("prod secret").unwrap();
        let second = html.find("signing").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_owner_alert_omits_links_and_recipient() {
        let html = render_owner_alert(&records()[..1], generated());
        assert!(html.contains("contact your administrator"));
        assert!(html.contains("prod secret"));
        assert!(!html.contains("portal.azure.com"));
        assert!(!html.contains("NotifyEmail"));
        assert!(!html.contains("team@x.com"));
    }

    #[test]
    fn test_empty_report_renders_placeholder_row() {
        let html = render_admin_report(&[], generated(), 30);
        assert!(html.contains("No expiring credentials found."));
        assert!(html.contains("colspan=\"7\""));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&#39;");
    }
}
