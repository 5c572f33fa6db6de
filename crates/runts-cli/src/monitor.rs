//! One monitoring run: fetch → diff → classify → notify → persist.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Local};
use futures::StreamExt;
use runts_core::{
    ChangeEvent, HistoryStore, NotificationPayload, Organization, RunReport, build,
    diff_snapshots, removed,
};
use runts_source::SnapshotSource;
use runts_store::ArtifactDir;
use tracing::{debug, info, warn};

pub struct RunOutcome {
    pub report: RunReport,
    pub payload: Option<NotificationPayload>,
    /// Artifact written for the issue-creation step, if any.
    pub artifact: Option<PathBuf>,
}

/// Run the monitor over `orgs`.
///
/// Snapshots are fetched with at most `concurrency` requests in flight, then
/// processed in configuration order. A failed fetch skips that organization
/// and leaves its history untouched. History is persisted only after the
/// notification artifact (if any) has been written, so a failed write means
/// the next run detects the same changes again. Once history is persisted,
/// every snapshot that fed it is acknowledged to the source so it cannot be
/// replayed as a fresh scrape. Pass `artifacts: None` to skip writing the
/// artifact (dry run).
pub async fn run_monitor<S: HistoryStore>(
    orgs: &[Organization],
    source: &dyn SnapshotSource,
    store: &mut S,
    artifacts: Option<&ArtifactDir>,
    concurrency: usize,
    now: DateTime<Local>,
) -> anyhow::Result<RunOutcome> {
    info!(organizations = orgs.len(), concurrency, "starting run");

    // `buffered` yields results in input order.
    let fetched: Vec<_> = futures::stream::iter(orgs)
        .map(|org| source.fetch(org))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = RunReport::new();
    let mut events = Vec::new();
    let mut consumed = Vec::new();

    for (org, result) in orgs.iter().zip(fetched) {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(fiscal_code = %org.fiscal_code, name = %org.name, error = %e, "scrape failed, history kept");
                report.failed(org, e.to_string());
                continue;
            }
        };

        let previous = store.load(&org.fiscal_code);
        if snapshot.is_empty() && !previous.is_empty() {
            warn!(
                fiscal_code = %org.fiscal_code,
                previous = previous.len(),
                "scrape returned no documents for an organization that had some"
            );
        }

        let new_records = diff_snapshots(&previous, &snapshot);
        let gone = removed(&previous, &snapshot);
        if !gone.is_empty() {
            debug!(fiscal_code = %org.fiscal_code, removed = gone.len(), "records no longer listed");
        }

        let org_events: Vec<ChangeEvent> = new_records
            .iter()
            .map(|record| ChangeEvent::new(org, record))
            .collect();
        for event in &org_events {
            info!(
                fiscal_code = %event.fiscal_code,
                category = %event.category,
                field = %event.field_name,
                value = %event.value,
                "new document"
            );
        }

        report.scanned(org, snapshot.len(), &org_events, gone.len());
        events.extend(org_events);
        store.replace(&org.fiscal_code, snapshot);
        consumed.push(org);
    }

    let payload = build(events, now);
    let artifact = match (&payload, artifacts) {
        (Some(payload), Some(dir)) => Some(
            dir.write(payload)
                .context("writing notification artifact; history not persisted")?,
        ),
        _ => None,
    };

    store.persist().context("persisting history")?;

    for org in consumed {
        source.acknowledge(org).await.with_context(|| {
            format!(
                "acknowledging snapshot for {}; it may be read again next run",
                org.fiscal_code
            )
        })?;
    }

    let counts = report.counts();
    info!(
        scanned = report.scanned_count(),
        failed = report.failures().len(),
        bilancio_2024 = counts.bilancio_2024,
        altro_bilancio = counts.altro_bilancio,
        altro_documento = counts.altro_documento,
        "run complete"
    );

    Ok(RunOutcome {
        report,
        payload,
        artifact,
    })
}
