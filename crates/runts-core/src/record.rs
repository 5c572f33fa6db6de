//! Document record model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A monitored third-sector organization, as listed in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(rename = "codice_fiscale")]
    pub fiscal_code: String,
    #[serde(rename = "nome")]
    pub name: String,
}

impl Organization {
    pub fn new(fiscal_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            fiscal_code: fiscal_code.into(),
            name: name.into(),
        }
    }
}

/// One document entry exposed by the registry for an organization.
///
/// Identity is the exact `(field_name, value)` pair. A revised value under the
/// same field name is a different record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub field_name: String,
    pub value: String,
}

impl DocumentRecord {
    /// Build a record, trimming the whitespace left over from cell extraction.
    pub fn new(field_name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            field_name: field_name.as_ref().trim().to_string(),
            value: value.as_ref().trim().to_string(),
        }
    }
}

/// The complete set of records observed for one organization at one time.
///
/// Ordered so that persisted history and per-organization event order are
/// deterministic.
pub type Snapshot = BTreeSet<DocumentRecord>;
