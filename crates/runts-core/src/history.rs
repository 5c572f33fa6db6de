//! History store abstraction.

use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::record::Snapshot;

/// Durable mapping from fiscal code to the last-known snapshot.
///
/// `replace` stages a full replacement for one organization and is visible to
/// subsequent `load` calls immediately. Nothing is durable until `persist`,
/// which must commit every staged replacement together. Implementations must
/// detect corruption when the store is opened, so `load` itself cannot fail.
pub trait HistoryStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Last snapshot for `org_id`, or empty if the organization is unknown.
    fn load(&self, org_id: &str) -> Snapshot;

    /// Stage `snapshot` as the complete history for `org_id`.
    fn replace(&mut self, org_id: &str, snapshot: Snapshot);

    /// Commit all staged replacements.
    fn persist(&mut self) -> Result<(), Self::Error>;

    /// Fiscal codes with stored or staged history, sorted.
    fn organizations(&self) -> Vec<String>;
}

/// In-memory history, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    committed: BTreeMap<String, Snapshot>,
    staged: BTreeMap<String, Snapshot>,
    persist_count: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an already-committed map.
    pub fn from_committed(committed: BTreeMap<String, Snapshot>) -> Self {
        Self {
            committed,
            ..Self::default()
        }
    }

    /// Committed state only, ignoring staged replacements.
    pub fn committed(&self) -> &BTreeMap<String, Snapshot> {
        &self.committed
    }

    /// Number of times `persist` has been called.
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl HistoryStore for MemoryHistory {
    type Error = Infallible;

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

    fn persist(&mut self) -> Result<(), Self::Error> {
        self.committed.append(&mut self.staged);
        self.persist_count += 1;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocumentRecord;

    fn snap(pairs: &[(&str, &str)]) -> Snapshot {
        pairs.iter().map(|(f, v)| DocumentRecord::new(f, v)).collect()
    }

    #[test]
    fn unknown_org_loads_empty() {
        let store = MemoryHistory::new();
        assert!(store.load("00000000000").is_empty());
    }

    #[test]
    fn replace_is_visible_before_persist() {
        let mut store = MemoryHistory::new();
        store.replace("A", snap(&[("Statuto", "v1")]));
        assert_eq!(store.load("A").len(), 1);
        assert!(store.committed().is_empty());
    }

    #[test]
    fn replace_is_full_replacement() {
        let mut store = MemoryHistory::new();
        store.replace("A", snap(&[("Statuto", "v1"), ("Bilancio", "2022")]));
        store.persist().unwrap();
        store.replace("A", snap(&[("Bilancio", "2023")]));
        store.persist().unwrap();
        assert_eq!(store.load("A"), snap(&[("Bilancio", "2023")]));
        assert_eq!(store.persist_count(), 2);
    }

    #[test]
    fn organizations_merges_staged_and_committed() {
        let mut store = MemoryHistory::new();
        store.replace("B", Snapshot::new());
        store.persist().unwrap();
        store.replace("A", Snapshot::new());
        store.replace("B", Snapshot::new());
        assert_eq!(store.organizations(), vec!["A".to_string(), "B".to_string()]);
    }
}
