//! Snapshot format shared by every source.

use runts_core::{DocumentRecord, Snapshot};
use serde::Deserialize;

use crate::SourceError;

/// Either the scraped records or the scraper's own failure report.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScrapeResult {
    Records(Vec<RawRecord>),
    Failure { error: String },
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(alias = "campo")]
    field_name: String,
    #[serde(alias = "valore")]
    value: String,
}

pub(crate) fn parse_snapshot(fiscal_code: &str, text: &str) -> Result<Snapshot, SourceError> {
    let parsed: ScrapeResult =
        serde_json::from_str(text).map_err(|source| SourceError::Json {
            fiscal_code: fiscal_code.to_string(),
            source,
        })?;
    match parsed {
        ScrapeResult::Records(records) => Ok(records
            .into_iter()
            .map(|r| DocumentRecord::new(r.field_name, r.value))
            .collect()),
        ScrapeResult::Failure { error } => Err(SourceError::Reported { reason: error }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_array() {
        let snap = parse_snapshot(
            "1",
            r#"[{"field_name": "Statuto", "value": "s.pdf"}, {"campo": "Bilancio", "valore": " 2023 "}]"#,
        )
        .unwrap();
        assert_eq!(snap.len(), 2);
        assert!(snap.contains(&DocumentRecord::new("Bilancio", "2023")));
    }

    #[test]
    fn empty_array_is_an_empty_snapshot() {
        assert!(parse_snapshot("1", "[]").unwrap().is_empty());
    }

    #[test]
    fn failure_object_is_an_error() {
        let err = parse_snapshot("1", r#"{"error": "Nessun risultato trovato"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Reported { reason } if reason == "Nessun risultato trovato"));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = parse_snapshot("1", r#"{"documenti": 3}"#).unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }
}
