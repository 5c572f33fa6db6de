//! Monitor configuration: the organizations to watch and who gets notified.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail};
use runts_core::Organization;
use serde::Deserialize;

/// Contents of `config.json`.
///
/// ```json
/// {
///   "enti": [ { "codice_fiscale": "12345678901", "nome": "ACME ETS" } ],
///   "email_destinatario": "ops@example.org"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(rename = "enti")]
    pub organizations: Vec<Organization>,
    #[serde(rename = "email_destinatario", default)]
    pub notify_email: Option<String>,
}

impl MonitorConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.organizations.is_empty() {
            bail!("config lists no organizations");
        }
        let mut seen = HashSet::new();
        for org in &self.organizations {
            if org.fiscal_code.trim().is_empty() {
                bail!("organization {:?} has an empty fiscal code", org.name);
            }
            // Used verbatim in snapshot file names and URLs.
            if !org.fiscal_code.chars().all(|c| c.is_ascii_alphanumeric()) {
                bail!(
                    "organization {:?} has an invalid fiscal code {:?}",
                    org.name,
                    org.fiscal_code
                );
            }
            if !seen.insert(org.fiscal_code.as_str()) {
                bail!("duplicate fiscal code in config: {}", org.fiscal_code);
            }
        }
        Ok(())
    }
}
