//! Notification payload construction.
//!
//! A run produces either nothing or one payload. Events are grouped by
//! [`Category`] in priority order; within a category they keep the order in
//! which organizations were processed.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::classify::{Category, classify, classify_field};
use crate::record::{DocumentRecord, Organization};

/// One newly observed record, with organization context and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub org_name: String,
    pub fiscal_code: String,
    pub field_name: String,
    pub value: String,
    pub category: Category,
}

impl ChangeEvent {
    /// Classify `record` and attach the organization it belongs to.
    pub fn new(org: &Organization, record: &DocumentRecord) -> Self {
        Self {
            org_name: org.name.clone(),
            fiscal_code: org.fiscal_code.clone(),
            field_name: record.field_name.clone(),
            value: record.value.clone(),
            category: classify(record),
        }
    }
}

/// Notification urgency, derived from the presence of 2024 statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Urgent { count: usize },
    Routine,
}

impl Urgency {
    /// Urgent when at least one 2024 financial statement is involved.
    pub fn from_count(bilancio_2024: usize) -> Self {
        if bilancio_2024 > 0 {
            Self::Urgent {
                count: bilancio_2024,
            }
        } else {
            Self::Routine
        }
    }

    /// Notification title for a run on `date`.
    pub fn title(&self, date: NaiveDate) -> String {
        let date = date.format("%d/%m/%Y");
        match self {
            Self::Urgent { count: 1 } => {
                format!("URGENTE: 1 nuovo bilancio 2024 pubblicato - {date}")
            }
            Self::Urgent { count } => {
                format!("URGENTE: {count} nuovi bilanci 2024 pubblicati - {date}")
            }
            Self::Routine => format!("Aggiornamenti RUNTS - {date}"),
        }
    }
}

/// The non-empty set of changes detected in one run.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    timestamp: DateTime<Local>,
    events: Vec<ChangeEvent>,
    urgency: Urgency,
}

/// Build the run's payload. Returns `None` when nothing changed.
pub fn build(
    mut events: Vec<ChangeEvent>,
    timestamp: DateTime<Local>,
) -> Option<NotificationPayload> {
    if events.is_empty() {
        return None;
    }

    // Stable: keeps organization order within each category.
    events.sort_by_key(|e| e.category);

    let urgent = events
        .iter()
        .filter(|e| e.category == Category::Bilancio2024)
        .count();
    let urgency = Urgency::from_count(urgent);

    Some(NotificationPayload {
        timestamp,
        events,
        urgency,
    })
}

impl NotificationPayload {
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// All events, already in category priority order.
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Never true for a payload returned by [`build`].
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Non-empty category groups in priority order.
    pub fn groups(&self) -> Vec<(Category, &[ChangeEvent])> {
        let mut groups = Vec::new();
        let mut start = 0;
        while start < self.events.len() {
            let category = self.events[start].category;
            let end = self.events[start..]
                .iter()
                .position(|e| e.category != category)
                .map_or(self.events.len(), |n| start + n);
            groups.push((category, &self.events[start..end]));
            start = end;
        }
        groups
    }

    /// Notification title, dated with the run timestamp.
    pub fn title(&self) -> String {
        self.urgency.title(self.timestamp.date_naive())
    }

    /// Wire structure handed to the issue-creation step.
    pub fn to_artifact(&self) -> NotificationArtifact {
        NotificationArtifact {
            changes: self
                .events
                .iter()
                .map(|e| ArtifactChange {
                    field_name: e.field_name.clone(),
                    org_name: e.org_name.clone(),
                    fiscal_code: e.fiscal_code.clone(),
                    value: e.value.clone(),
                })
                .collect(),
        }
    }
}

// ── Artifact wire format ──

/// On-disk notification artifact: `{ "changes": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationArtifact {
    pub changes: Vec<ArtifactChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactChange {
    #[serde(rename = "campo")]
    pub field_name: String,
    #[serde(rename = "nome")]
    pub org_name: String,
    #[serde(rename = "codice_fiscale")]
    pub fiscal_code: String,
    #[serde(rename = "valore_nuovo")]
    pub value: String,
}

impl ArtifactChange {
    pub fn category(&self) -> Category {
        classify_field(&self.field_name)
    }
}

/// Artifact changes split by category, for issue rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitioned {
    pub bilancio_2024: Vec<ArtifactChange>,
    pub altro_bilancio: Vec<ArtifactChange>,
    pub altro_documento: Vec<ArtifactChange>,
}

impl Partitioned {
    pub fn urgency(&self) -> Urgency {
        Urgency::from_count(self.bilancio_2024.len())
    }

    pub fn len(&self) -> usize {
        self.bilancio_2024.len() + self.altro_bilancio.len() + self.altro_documento.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, category: Category) -> &[ArtifactChange] {
        match category {
            Category::Bilancio2024 => &self.bilancio_2024,
            Category::AltroBilancio => &self.altro_bilancio,
            Category::AltroDocumento => &self.altro_documento,
        }
    }
}

impl NotificationArtifact {
    /// Re-classify the changes into the three categories, preserving order.
    pub fn partition(&self) -> Partitioned {
        let mut out = Partitioned::default();
        for change in &self.changes {
            let bucket = match change.category() {
                Category::Bilancio2024 => &mut out.bilancio_2024,
                Category::AltroBilancio => &mut out.altro_bilancio,
                Category::AltroDocumento => &mut out.altro_documento,
            };
            bucket.push(change.clone());
        }
        out
    }
}
