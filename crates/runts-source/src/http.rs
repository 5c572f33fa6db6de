//! HTTP client for a scraping sidecar that serves snapshots as JSON.

use async_trait::async_trait;
use runts_core::{Organization, Snapshot};
use tracing::info;

use crate::wire::parse_snapshot;
use crate::{SnapshotSource, SourceError};

/// Pulls snapshots from `GET {base_url}/snapshots/{fiscal_code}`.
///
/// The response body uses the same format as the directory source: a record
/// array, or `{"error": "..."}` when the scrape failed.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// `base_url` should be like `http://localhost:8080` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client, e.g. one with a request timeout.
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn snapshot_url(&self, fiscal_code: &str) -> String {
        format!("{}/snapshots/{}", self.base_url, fiscal_code)
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self, org: &Organization) -> Result<Snapshot, SourceError> {
        let url = self.snapshot_url(&org.fiscal_code);

        info!(url = %url, "pulling snapshot");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let snapshot = parse_snapshot(&org.fiscal_code, &text)?;
        info!(fiscal_code = %org.fiscal_code, records = snapshot.len(), "pulled snapshot");
        Ok(snapshot)
    }
}
