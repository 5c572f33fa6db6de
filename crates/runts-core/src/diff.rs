//! Snapshot diffing.
//!
//! Only additions are reported. Records that disappeared from the portal are
//! dropped from history by the next `replace` and never become change events.

use crate::history::HistoryStore;
use crate::record::Snapshot;

/// Records in `scraped` that are not in `previous`.
pub fn diff_snapshots(previous: &Snapshot, scraped: &Snapshot) -> Snapshot {
    scraped.difference(previous).cloned().collect()
}

/// Records in `previous` that are gone from `scraped`. Used for logging only.
pub fn removed(previous: &Snapshot, scraped: &Snapshot) -> Snapshot {
    previous.difference(scraped).cloned().collect()
}

/// New records for `org_id` relative to what `store` currently holds.
pub fn diff<S: HistoryStore + ?Sized>(store: &S, org_id: &str, scraped: &Snapshot) -> Snapshot {
    let previous = store.load(org_id);
    diff_snapshots(&previous, scraped)
}
