//! Plain-text and Markdown rendering for run summaries and issues.

use std::fmt::Write;

use chrono::NaiveDate;
use runts_core::{Category, NotificationArtifact, NotificationPayload, RunReport};

/// Run summary for the log and the email collaborator.
///
/// Returns `None` for a steady-state run (no changes, no failures), which
/// must stay silent.
pub fn render_summary(report: &RunReport, payload: Option<&NotificationPayload>) -> Option<String> {
    let failures = report.failures();
    if payload.is_none() && failures.is_empty() {
        return None;
    }

    let mut out = String::new();
    match payload {
        Some(p) => {
            let _ = writeln!(out, "{}", p.title());
        }
        None => {
            let _ = writeln!(out, "Monitoraggio RUNTS: nessuna novità");
        }
    }
    let _ = writeln!(out);

    let counts = report.counts();
    for category in Category::ALL {
        let _ = writeln!(out, "  {:<20} {}", category.heading(), counts.get(category));
    }
    let _ = writeln!(
        out,
        "  {:<20} {} / {}",
        "Enti controllati",
        report.scanned_count(),
        report.orgs().len()
    );

    if let Some(payload) = payload {
        for (category, events) in payload.groups() {
            let _ = writeln!(out, "\n== {} ({}) ==", category.heading(), events.len());
            for e in events {
                let _ = writeln!(
                    out,
                    "- {} ({}): {} = {}",
                    e.org_name, e.fiscal_code, e.field_name, e.value
                );
            }
        }
    }

    if !failures.is_empty() {
        let _ = writeln!(out, "\n== Enti non verificati ({}) ==", failures.len());
        for (org, reason) in failures {
            let _ = writeln!(out, "- {} ({}): {}", org.name, org.fiscal_code, reason);
        }
    }

    Some(out)
}

/// Issue title and Markdown body for one notification artifact.
pub fn render_issue(artifact: &NotificationArtifact, date: NaiveDate) -> (String, String) {
    let parts = artifact.partition();
    let title = parts.urgency().title(date);

    let mut body = String::new();
    for category in Category::ALL {
        let changes = parts.get(category);
        if changes.is_empty() {
            continue;
        }
        let _ = writeln!(body, "## {} ({})\n", category.heading(), changes.len());
        let _ = writeln!(body, "| Ente | Codice fiscale | Campo | Valore |");
        let _ = writeln!(body, "|---|---|---|---|");
        for c in changes {
            let _ = writeln!(
                body,
                "| {} | {} | {} | {} |",
                escape_cell(&c.org_name),
                escape_cell(&c.fiscal_code),
                escape_cell(&c.field_name),
                escape_cell(&c.value)
            );
        }
        let _ = writeln!(body);
    }

    (title, body)
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use runts_core::{ChangeEvent, DocumentRecord, Organization, build};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn steady_state_renders_nothing() {
        let mut report = RunReport::new();
        report.scanned(&Organization::new("1", "A"), 4, &[], 0);
        assert!(render_summary(&report, None).is_none());
    }

    #[test]
    fn failures_alone_are_reported() {
        let mut report = RunReport::new();
        report.scanned(&Organization::new("1", "A"), 4, &[], 0);
        report.failed(&Organization::new("2", "B"), "portal timeout");
        let text = render_summary(&report, None).unwrap();
        assert!(text.contains("Enti non verificati (1)"));
        assert!(text.contains("B (2): portal timeout"));
        assert!(text.contains("1 / 2"));
    }

    #[test]
    fn summary_lists_changes_by_category() {
        let org = Organization::new("12345678901", "ACME");
        let events = vec![
            ChangeEvent::new(&org, &DocumentRecord::new("Statuto", "s.pdf")),
            ChangeEvent::new(
                &org,
                &DocumentRecord::new("Nuovo bilancio 2024 pubblicato", "Bilancio 2024.pdf"),
            ),
        ];
        let mut report = RunReport::new();
        report.scanned(&org, 2, &events, 0);
        let payload = build(events, now()).unwrap();

        let text = render_summary(&report, Some(&payload)).unwrap();
        assert!(text.starts_with("URGENTE: 1 nuovo bilancio 2024 pubblicato - 01/07/2025"));
        let urgent = text.find("== Nuovi bilanci 2024 (1) ==").unwrap();
        let other = text.find("== Altri documenti (1) ==").unwrap();
        assert!(urgent < other);
    }

    #[test]
    fn issue_body_partitions_and_escapes() {
        let json = r#"{"changes": [
            {"campo": "Statuto", "nome": "A|B", "codice_fiscale": "1", "valore_nuovo": "s"},
            {"campo": "Bilancio", "nome": "C", "codice_fiscale": "3", "valore_nuovo": "2023"}
        ]}"#;
        let artifact: NotificationArtifact = serde_json::from_str(json).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let (title, body) = render_issue(&artifact, date);

        assert_eq!(title, "Aggiornamenti RUNTS - 01/07/2025");
        assert!(!body.contains("Nuovi bilanci 2024"));
        let bilanci = body.find("## Altri bilanci (1)").unwrap();
        let documenti = body.find("## Altri documenti (1)").unwrap();
        assert!(bilanci < documenti);
        assert!(body.contains("| A\\|B | 1 | Statuto | s |"));
    }
}
