//! JSON-file history store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use runts_core::{HistoryStore, Snapshot};
use tracing::{debug, info};

use crate::StoreError;
use crate::atomic::write_atomic;

/// History store backed by a single JSON file.
///
/// The file maps fiscal code to the array of `{field_name, value}` records seen
/// on the last successful scrape. The whole file is parsed on
/// [`open`](Self::open), so a corrupt store is rejected before any diffing
/// happens. Replacements are staged in memory and written together by
/// [`persist`](HistoryStore::persist) through a temp file and rename, so a
/// crash leaves either the old or the new file on disk.
pub struct JsonHistoryStore {
    path: PathBuf,
    committed: BTreeMap<String, Snapshot>,
    staged: BTreeMap<String, Snapshot>,
}

impl JsonHistoryStore {
    /// Open the store at `path`. A missing file is an empty history.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let committed: BTreeMap<String, Snapshot> = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no history file, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let store = Self {
            path: path.to_path_buf(),
            committed,
            staged: BTreeMap::new(),
        };
        debug!(
            path = %store.path.display(),
            organizations = store.committed.len(),
            "opened history"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// History as last persisted, ignoring staged replacements.
    pub fn committed(&self) -> &BTreeMap<String, Snapshot> {
        &self.committed
    }

    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }
}

impl HistoryStore for JsonHistoryStore {
    type Error = StoreError;

    fn load(&self, org_id: &str) -> Snapshot {
        self.staged
            .get(org_id)
            .or_else(|| self.committed.get(org_id))
            .cloned()
            .unwrap_or_default()
    }

    fn replace(&mut self, org_id: &str, snapshot: Snapshot) {
        self.staged.insert(org_id.to_string(), snapshot);
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        if self.staged.is_empty() {
            debug!("no staged history, nothing to persist");
            return Ok(());
        }

        let mut next = self.committed.clone();
        next.extend(self.staged.iter().map(|(k, v)| (k.clone(), v.clone())));

        let json = serde_json::to_vec_pretty(&next)?;
        write_atomic(&self.path, &json)?;

        info!(
            path = %self.path.display(),
            updated = self.staged.len(),
            organizations = next.len(),
            "history persisted"
        );
        self.committed = next;
        self.staged.clear();
        Ok(())
    }

    fn organizations(&self) -> Vec<String> {
        let mut orgs: Vec<String> = self
            .committed
            .keys()
            .chain(self.staged.keys())
            .cloned()
            .collect();
        orgs.sort();
        orgs.dedup();
        orgs
    }
}
