//! Field-name classification of newly observed records.

use serde::{Deserialize, Serialize};

use crate::labels::{
    BILANCIO_2024_LABEL, BILANCIO_MARKER, HEADING_ALTRO_BILANCIO, HEADING_ALTRO_DOCUMENTO,
    HEADING_BILANCIO_2024,
};
use crate::record::DocumentRecord;

/// Notification category, declared (and ordered) by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A 2024 financial statement was published. Highest priority.
    Bilancio2024,
    /// Any other financial statement.
    AltroBilancio,
    /// Everything else, including labels the portal introduced after us.
    AltroDocumento,
}

impl Category {
    /// All categories in priority order.
    pub const ALL: [Category; 3] = [
        Category::Bilancio2024,
        Category::AltroBilancio,
        Category::AltroDocumento,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bilancio2024 => "bilancio_2024",
            Self::AltroBilancio => "altro_bilancio",
            Self::AltroDocumento => "altro_documento",
        }
    }

    /// Human-readable section heading.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Bilancio2024 => HEADING_BILANCIO_2024,
            Self::AltroBilancio => HEADING_ALTRO_BILANCIO,
            Self::AltroDocumento => HEADING_ALTRO_DOCUMENTO,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a record by its field name. Rules are checked in order; the first
/// match wins.
pub fn classify(record: &DocumentRecord) -> Category {
    classify_field(&record.field_name)
}

pub(crate) fn classify_field(field_name: &str) -> Category {
    if field_name == BILANCIO_2024_LABEL {
        Category::Bilancio2024
    } else if field_name.to_lowercase().contains(BILANCIO_MARKER) {
        Category::AltroBilancio
    } else {
        tracing::debug!(field_name, "field classified as other document");
        Category::AltroDocumento
    }
}
