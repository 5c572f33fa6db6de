//! Run-level summary: per-organization outcome and per-category counts.

use crate::classify::Category;
use crate::notify::ChangeEvent;
use crate::record::Organization;

/// What happened to one organization during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgOutcome {
    /// Snapshot retrieved and diffed; history replaced.
    Scanned {
        total_records: usize,
        new_records: usize,
        removed_records: usize,
    },
    /// Scrape failed; history left untouched.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgReport {
    pub org: Organization,
    pub outcome: OrgOutcome,
}

/// Count of change events per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub bilancio_2024: usize,
    pub altro_bilancio: usize,
    pub altro_documento: usize,
}

impl CategoryCounts {
    pub fn add(&mut self, category: Category) {
        match category {
            Category::Bilancio2024 => self.bilancio_2024 += 1,
            Category::AltroBilancio => self.altro_bilancio += 1,
            Category::AltroDocumento => self.altro_documento += 1,
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Bilancio2024 => self.bilancio_2024,
            Category::AltroBilancio => self.altro_bilancio,
            Category::AltroDocumento => self.altro_documento,
        }
    }

    pub fn total(&self) -> usize {
        self.bilancio_2024 + self.altro_bilancio + self.altro_documento
    }
}

/// Summary of one monitoring run, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    orgs: Vec<OrgReport>,
    counts: CategoryCounts,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful scan and the events it produced.
    pub fn scanned(
        &mut self,
        org: &Organization,
        total_records: usize,
        events: &[ChangeEvent],
        removed_records: usize,
    ) {
        for event in events {
            self.counts.add(event.category);
        }
        self.orgs.push(OrgReport {
            org: org.clone(),
            outcome: OrgOutcome::Scanned {
                total_records,
                new_records: events.len(),
                removed_records,
            },
        });
    }

    pub fn failed(&mut self, org: &Organization, reason: impl Into<String>) {
        self.orgs.push(OrgReport {
            org: org.clone(),
            outcome: OrgOutcome::Failed {
                reason: reason.into(),
            },
        });
    }

    pub fn orgs(&self) -> &[OrgReport] {
        &self.orgs
    }

    pub fn counts(&self) -> CategoryCounts {
        self.counts
    }

    /// Organizations whose scrape failed, with the reason.
    pub fn failures(&self) -> Vec<(&Organization, &str)> {
        self.orgs
            .iter()
            .filter_map(|r| match &r.outcome {
                OrgOutcome::Failed { reason } => Some((&r.org, reason.as_str())),
                OrgOutcome::Scanned { .. } => None,
            })
            .collect()
    }

    pub fn scanned_count(&self) -> usize {
        self.orgs.len() - self.failures().len()
    }

    pub fn has_changes(&self) -> bool {
        self.counts.total() > 0
    }
}
