mod config;
mod display;
mod monitor;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use runts_core::{HistoryStore, MemoryHistory};
use runts_source::{DirectorySource, SnapshotSource};
use runts_store::{ArtifactDir, JsonHistoryStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::MonitorConfig;
use crate::monitor::{RunOutcome, run_monitor};

#[derive(Parser)]
#[command(name = "runts-monitor", version, about = "Detect newly published documents on the RUNTS registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Diff fresh snapshots against history and write a notification if anything changed.
    Run(RunArgs),
    /// Render pending notification artifacts as issue files, then delete them.
    Issues {
        #[arg(long, env = "RUNTS_NOTIFICATIONS", default_value = "data/notifications")]
        notifications: PathBuf,
        /// Directory for rendered issue files (first line is the title).
        #[arg(long, default_value = "issues")]
        out_dir: PathBuf,
    },
    /// Show stored history.
    History {
        #[arg(long, env = "RUNTS_HISTORY", default_value = "data/history.json")]
        history: PathBuf,
        /// Print the records of one organization instead of the counts.
        #[arg(long)]
        org: Option<String>,
    },
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, env = "RUNTS_CONFIG", default_value = "config.json")]
    config: PathBuf,
    #[arg(long, env = "RUNTS_HISTORY", default_value = "data/history.json")]
    history: PathBuf,
    #[arg(long, env = "RUNTS_NOTIFICATIONS", default_value = "data/notifications")]
    notifications: PathBuf,
    /// Directory of scraper output, one `<fiscal_code>.json` per organization.
    #[arg(
        long,
        env = "RUNTS_SNAPSHOTS",
        conflicts_with = "snapshot_url",
        required_unless_present = "snapshot_url"
    )]
    snapshots: Option<PathBuf>,
    /// Base URL of a scraping sidecar serving `/snapshots/<fiscal_code>`.
    #[arg(long, env = "RUNTS_SNAPSHOT_URL")]
    snapshot_url: Option<String>,
    /// Maximum snapshots fetched at once.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    /// Also write the run summary here when there is something to report.
    #[arg(long)]
    summary_out: Option<PathBuf>,
    /// Diff and report without writing history or artifacts.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("runts-monitor v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => cmd_run(&args).await,
        Command::Issues {
            notifications,
            out_dir,
        } => cmd_issues(&notifications, &out_dir),
        Command::History { history, org } => cmd_history(&history, org.as_deref()),
    }
}

// ── run ──

async fn cmd_run(args: &RunArgs) -> anyhow::Result<()> {
    let config = MonitorConfig::load(&args.config)?;
    let outcome = execute_run(args, &config).await?;
    if let Some(path) = &outcome.artifact {
        info!(path = %path.display(), "notification pending for issue creation");
    }

    let Some(summary) = display::render_summary(&outcome.report, outcome.payload.as_ref()) else {
        return Ok(());
    };
    print!("{summary}");

    if let Some(path) = &args.summary_out
        && !args.dry_run
    {
        std::fs::write(path, &summary)
            .with_context(|| format!("writing summary {}", path.display()))?;
        info!(
            path = %path.display(),
            recipient = config.notify_email.as_deref().unwrap_or("-"),
            "summary ready for email"
        );
    }
    Ok(())
}

async fn execute_run(args: &RunArgs, config: &MonitorConfig) -> anyhow::Result<RunOutcome> {
    // Corrupt history aborts here, before anything is fetched or written.
    let mut store = JsonHistoryStore::open(&args.history)
        .with_context(|| format!("opening history {}", args.history.display()))?;
    let source = build_source(args)?;
    let now = chrono::Local::now();

    if args.dry_run {
        warn!("dry run: history and notification artifacts will not be written");
        let mut scratch = MemoryHistory::from_committed(store.committed().clone());
        return run_monitor(
            &config.organizations,
            source.as_ref(),
            &mut scratch,
            None,
            args.concurrency,
            now,
        )
        .await;
    }

    let artifacts = ArtifactDir::new(&args.notifications);
    run_monitor(
        &config.organizations,
        source.as_ref(),
        &mut store,
        Some(&artifacts),
        args.concurrency,
        now,
    )
    .await
}

fn build_source(args: &RunArgs) -> anyhow::Result<Box<dyn SnapshotSource>> {
    match (&args.snapshots, &args.snapshot_url) {
        (Some(dir), _) if args.dry_run => Ok(Box::new(DirectorySource::new(dir).keep_files())),
        (Some(dir), _) => Ok(Box::new(DirectorySource::new(dir))),
        (None, Some(url)) => http_source(url),
        (None, None) => bail!("either --snapshots or --snapshot-url is required"),
    }
}

#[cfg(feature = "http")]
fn http_source(url: &str) -> anyhow::Result<Box<dyn SnapshotSource>> {
    Ok(Box::new(runts_source::HttpSource::new(url.to_string())))
}

#[cfg(not(feature = "http"))]
fn http_source(_url: &str) -> anyhow::Result<Box<dyn SnapshotSource>> {
    bail!("--snapshot-url requires the `http` feature")
}

// ── issues ──

fn cmd_issues(notifications: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let dir = ArtifactDir::new(notifications);
    let pending = dir.pending()?;
    if pending.is_empty() {
        info!(dir = %notifications.display(), "no pending notifications");
        return Ok(());
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let today = chrono::Local::now().date_naive();

    for artifact in pending {
        let stem = artifact
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("notification")
            .to_string();
        let issue_path = out_dir.join(format!("issue_{stem}.md"));

        let run_date = artifact.run_date().unwrap_or(today);
        let written = artifact.consume(|a| -> anyhow::Result<PathBuf> {
            let (title, body) = display::render_issue(a, run_date);
            std::fs::write(&issue_path, format!("{title}\n\n{body}"))
                .with_context(|| format!("writing {}", issue_path.display()))?;
            Ok(issue_path.clone())
        })?;
        println!("{}", written.display());
    }
    Ok(())
}

// ── history ──

fn cmd_history(history: &Path, org: Option<&str>) -> anyhow::Result<()> {
    let store = JsonHistoryStore::open(history)
        .with_context(|| format!("opening history {}", history.display()))?;

    match org {
        Some(fiscal_code) => {
            for record in store.load(fiscal_code) {
                println!("{:<40} {}", record.field_name, record.value);
            }
        }
        None => {
            for fiscal_code in store.organizations() {
                println!("{:<16} {}", fiscal_code, store.load(&fiscal_code).len());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use runts_store::StoreError;
    use tempfile::TempDir;

    fn args(tmp: &TempDir) -> RunArgs {
        RunArgs {
            config: tmp.path().join("config.json"),
            history: tmp.path().join("data").join("history.json"),
            notifications: tmp.path().join("data").join("notifications"),
            snapshots: Some(tmp.path().join("snapshots")),
            snapshot_url: None,
            concurrency: 2,
            summary_out: None,
            dry_run: false,
        }
    }

    fn config() -> MonitorConfig {
        serde_json::from_str(r#"{"enti": [{"codice_fiscale": "12345678901", "nome": "ACME"}]}"#)
            .unwrap()
    }

    fn write_snapshot(tmp: &TempDir) {
        let dir = tmp.path().join("snapshots");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("12345678901.json"),
            r#"[{"field_name": "Nuovo bilancio 2024 pubblicato", "value": "Bilancio 2024.pdf"}]"#,
        )
        .unwrap();
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn corrupt_history_aborts_before_writing() {
        let tmp = TempDir::new().unwrap();
        let args = args(&tmp);
        write_snapshot(&tmp);
        std::fs::create_dir_all(args.history.parent().unwrap()).unwrap();
        std::fs::write(&args.history, "{ truncated").unwrap();

        let err = execute_run(&args, &config()).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Corrupt { .. })
        ));
        assert!(!args.notifications.exists());
        assert_eq!(std::fs::read_to_string(&args.history).unwrap(), "{ truncated");
    }

    #[tokio::test]
    async fn run_writes_history_and_artifact() {
        let tmp = TempDir::new().unwrap();
        let args = args(&tmp);
        write_snapshot(&tmp);

        let outcome = execute_run(&args, &config()).await.unwrap();
        assert!(outcome.payload.is_some());
        assert!(outcome.artifact.unwrap().exists());

        let store = JsonHistoryStore::open(&args.history).unwrap();
        assert_eq!(store.load("12345678901").len(), 1);

        // The scraper writes the same snapshot again: nothing new.
        write_snapshot(&tmp);
        let outcome = execute_run(&args, &config()).await.unwrap();
        assert!(outcome.payload.is_none());
        assert!(outcome.report.failures().is_empty());
    }

    #[tokio::test]
    async fn snapshot_left_from_previous_run_is_a_failure() {
        let tmp = TempDir::new().unwrap();
        let args = args(&tmp);
        write_snapshot(&tmp);
        execute_run(&args, &config()).await.unwrap();
        let history = std::fs::read_to_string(&args.history).unwrap();

        // No scraper write in between.
        let outcome = execute_run(&args, &config()).await.unwrap();
        let failures = outcome.report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.fiscal_code, "12345678901");
        assert_eq!(outcome.report.scanned_count(), 0);
        assert_eq!(std::fs::read_to_string(&args.history).unwrap(), history);

        let summary = display::render_summary(&outcome.report, None).unwrap();
        assert!(summary.contains("Enti non verificati (1)"));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut args = args(&tmp);
        args.dry_run = true;
        write_snapshot(&tmp);

        let outcome = execute_run(&args, &config()).await.unwrap();
        assert!(outcome.payload.is_some());
        assert!(outcome.artifact.is_none());
        assert!(!args.history.exists());
        assert!(!args.notifications.exists());
        assert!(tmp.path().join("snapshots").join("12345678901.json").exists());
    }

    #[tokio::test]
    async fn issues_consumes_artifacts() {
        let tmp = TempDir::new().unwrap();
        let args = args(&tmp);
        write_snapshot(&tmp);
        execute_run(&args, &config()).await.unwrap();

        let out_dir = tmp.path().join("issues");
        cmd_issues(&args.notifications, &out_dir).unwrap();

        assert!(ArtifactDir::new(&args.notifications).pending().unwrap().is_empty());
        let issues: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
        assert_eq!(issues.len(), 1);
        let text = std::fs::read_to_string(issues[0].as_ref().unwrap().path()).unwrap();
        assert!(text.starts_with("URGENTE: 1 nuovo bilancio 2024 pubblicato"));
        assert!(text.contains("| ACME | 12345678901 | Nuovo bilancio 2024 pubblicato | Bilancio 2024.pdf |"));
    }

    #[test]
    fn issue_title_uses_run_date_not_today() {
        let tmp = TempDir::new().unwrap();
        let notifications = tmp.path().join("notifications");
        std::fs::create_dir_all(&notifications).unwrap();
        std::fs::write(
            notifications.join("notification_20250701_093000.json"),
            r#"{"changes": [{"campo": "Statuto", "nome": "ACME", "codice_fiscale": "12345678901", "valore_nuovo": "s.pdf"}]}"#,
        )
        .unwrap();

        let out_dir = tmp.path().join("issues");
        cmd_issues(&notifications, &out_dir).unwrap();

        let text =
            std::fs::read_to_string(out_dir.join("issue_notification_20250701_093000.md")).unwrap();
        assert!(text.starts_with("Aggiornamenti RUNTS - 01/07/2025\n"));
    }
}
