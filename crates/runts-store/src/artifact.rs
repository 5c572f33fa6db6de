//! Notification artifact directory.
//!
//! One JSON file per run that produced changes. The issue-creation step lists
//! pending artifacts, processes each one and deletes it only after processing
//! succeeded, so a failed step leaves the artifact in place for a retry.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use runts_core::{NotificationArtifact, NotificationPayload};
use tracing::{info, warn};

use crate::StoreError;
use crate::atomic::write_temp;

const PREFIX: &str = "notification_";
const EXTENSION: &str = "json";

/// Directory holding notification artifacts awaiting the issue-creation step.
pub struct ArtifactDir {
    dir: PathBuf,
}

/// An artifact file found on disk, not yet consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArtifact {
    path: PathBuf,
}

impl ArtifactDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Durably write `payload` as `notification_<YYYYmmdd_HHMMSS>.json`.
    ///
    /// Returns the path written. A second artifact within the same second gets
    /// a numeric suffix. Existing files are never replaced, even by a
    /// concurrent writer.
    pub fn write(&self, payload: &NotificationPayload) -> Result<PathBuf, StoreError> {
        let stem = format!("{PREFIX}{}", payload.timestamp().format("%Y%m%d_%H%M%S"));
        let json = serde_json::to_vec_pretty(&payload.to_artifact())?;
        let mut tmp = write_temp(&self.dir, &json)?;

        let mut n = 0;
        let path = loop {
            let path = match n {
                0 => self.dir.join(format!("{stem}.{EXTENSION}")),
                n => self.dir.join(format!("{stem}_{n}.{EXTENSION}")),
            };
            match tmp.persist_noclobber(&path) {
                Ok(_) => break path,
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    tmp = e.file;
                    n += 1;
                }
                Err(e) => return Err(StoreError::io(&path, e.error)),
            }
        };
        info!(path = %path.display(), changes = payload.len(), "notification artifact written");
        Ok(path)
    }

    /// Artifacts awaiting consumption, oldest first.
    pub fn pending(&self) -> Result<Vec<PendingArtifact>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut pending = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let is_artifact = path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|name| name.starts_with(PREFIX))
                && path.extension().and_then(|s| s.to_str()) == Some(EXTENSION);
            if is_artifact {
                pending.push(PendingArtifact { path });
            }
        }
        // Timestamped names sort chronologically.
        pending.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(pending)
    }
}

impl PendingArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Date of the run that wrote this artifact, taken from its file name.
    pub fn run_date(&self) -> Option<NaiveDate> {
        let stem = self.path.file_stem()?.to_str()?;
        let digits = stem.strip_prefix(PREFIX)?.get(..8)?;
        NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
    }

    /// Parse the artifact without consuming it.
    pub fn load(&self) -> Result<NotificationArtifact, StoreError> {
        let text =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_str(&text).map_err(|source| StoreError::MalformedArtifact {
            path: self.path.clone(),
            source,
        })
    }

    /// Run `f` on the artifact and delete the file if it succeeds.
    ///
    /// On error the file is kept and the error returned unchanged.
    pub fn consume<T, E, F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&NotificationArtifact) -> Result<T, E>,
        E: From<StoreError>,
    {
        let artifact = self.load()?;
        let out = match f(&artifact) {
            Ok(out) => out,
            Err(e) => {
                warn!(path = %self.path.display(), "artifact processing failed, keeping file");
                return Err(e);
            }
        };
        std::fs::remove_file(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        info!(path = %self.path.display(), "artifact consumed");
        Ok(out)
    }
}
