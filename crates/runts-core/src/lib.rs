//! Change-detection engine for the RUNTS registry monitor.
//!
//! Compares freshly scraped document snapshots against the stored history,
//! classifies what is new and builds at most one notification per run.

pub mod classify;
pub mod diff;
pub mod history;
pub mod labels;
pub mod notify;
pub mod record;
pub mod report;

pub use classify::{Category, classify};
pub use diff::{diff, diff_snapshots, removed};
pub use history::{HistoryStore, MemoryHistory};
pub use notify::{
    ArtifactChange, ChangeEvent, NotificationArtifact, NotificationPayload, Partitioned, Urgency,
    build,
};
pub use record::{DocumentRecord, Organization, Snapshot};
pub use report::{CategoryCounts, OrgOutcome, OrgReport, RunReport};
