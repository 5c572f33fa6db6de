//! Directory of scraper output files, one per fiscal code.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use runts_core::{Organization, Snapshot};
use tracing::debug;

use crate::wire::parse_snapshot;
use crate::{SnapshotSource, SourceError};

/// Reads `<dir>/<fiscal_code>.json` written by the scraper.
///
/// A missing file is a scrape failure: the scraper did not finish for that
/// organization. Files are deleted once acknowledged, so each one feeds
/// exactly one committed run.
pub struct DirectorySource {
    dir: PathBuf,
    keep_files: bool,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keep_files: false,
        }
    }

    /// Leave snapshot files in place on acknowledge (dry runs).
    pub fn keep_files(mut self) -> Self {
        self.keep_files = true;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self, fiscal_code: &str) -> PathBuf {
        self.dir.join(format!("{fiscal_code}.json"))
    }
}

#[async_trait]
impl SnapshotSource for DirectorySource {
    async fn fetch(&self, org: &Organization) -> Result<Snapshot, SourceError> {
        let path = self.snapshot_path(&org.fiscal_code);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::Missing {
                    fiscal_code: org.fiscal_code.clone(),
                    path,
                });
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        };

        let snapshot = parse_snapshot(&org.fiscal_code, &text)?;
        debug!(
            fiscal_code = %org.fiscal_code,
            records = snapshot.len(),
            "read snapshot file"
        );
        Ok(snapshot)
    }

    async fn acknowledge(&self, org: &Organization) -> Result<(), SourceError> {
        if self.keep_files {
            return Ok(());
        }
        let path = self.snapshot_path(&org.fiscal_code);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(fiscal_code = %org.fiscal_code, "snapshot file consumed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SourceError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runts_core::DocumentRecord;
    use tempfile::TempDir;

    fn acme() -> Organization {
        Organization::new("12345678901", "ACME")
    }

    #[tokio::test]
    async fn reads_records_for_org() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("12345678901.json"),
            r#"[{"field_name": "Nuovo bilancio 2024 pubblicato", "value": "Bilancio 2024.pdf"}]"#,
        )
        .unwrap();

        let source = DirectorySource::new(tmp.path());
        let snap = source.fetch(&acme()).await.unwrap();
        assert_eq!(
            snap.into_iter().collect::<Vec<_>>(),
            vec![DocumentRecord::new(
                "Nuovo bilancio 2024 pubblicato",
                "Bilancio 2024.pdf"
            )]
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_failure() {
        let tmp = TempDir::new().unwrap();
        let source = DirectorySource::new(tmp.path());
        let result = source.fetch(&acme()).await;
        assert!(matches!(result, Err(SourceError::Missing { .. })));
    }

    #[tokio::test]
    async fn acknowledged_snapshot_is_not_read_twice() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("12345678901.json"), "[]").unwrap();

        let source = DirectorySource::new(tmp.path());
        source.fetch(&acme()).await.unwrap();
        source.acknowledge(&acme()).await.unwrap();

        let again = source.fetch(&acme()).await;
        assert!(matches!(again, Err(SourceError::Missing { .. })));
        // Acknowledging an already-consumed snapshot is harmless.
        source.acknowledge(&acme()).await.unwrap();
    }

    #[tokio::test]
    async fn keep_files_leaves_snapshot_in_place() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("12345678901.json");
        std::fs::write(&path, "[]").unwrap();

        let source = DirectorySource::new(tmp.path()).keep_files();
        source.acknowledge(&acme()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn scraper_failure_report_is_propagated() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("12345678901.json"),
            r#"{"error": "timeout waiting for results table"}"#,
        )
        .unwrap();
        let source = DirectorySource::new(tmp.path());
        let result = source.fetch(&acme()).await;
        assert!(matches!(result, Err(SourceError::Reported { .. })));
    }
}
