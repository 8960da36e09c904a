//! Transition scheduler CLI.
//!
//! Sweeps users created inside a date window and requests their transitions;
//! with the in-process bus wired, each revision request immediately drives a
//! migration. Exit code 0 on success, 1 on error. Log lines carry a
//! correlation microsecond timestamp for tracing one run across services.
//!
//! ```text
//! quillsync-scheduler 2024-01-01 2024-03-31 true
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use quillsync_domain::time;
use quillsync_events::InProcessEventBus;
use quillsync_storage::sqlite::{
    self, SqliteConfig, SqliteRevisionStore, SqliteTransitionStatusStore, SqliteUserStore,
};
use quillsync_storage::TransitionStatusRepository;
use quillsync_transition::{
    RevisionMigrator, SchedulerReport, TransitionRequestedHandler, TransitionScheduler,
    TransitionStatusUpdatedHandler,
};

/// Request transitions for users created inside a date window.
#[derive(Debug, Parser)]
#[command(name = "quillsync-scheduler")]
struct Args {
    /// Start of the user creation window (ISO 8601 or YYYY-MM-DD)
    start_date: String,
    /// End of the window, inclusive
    end_date: String,
    /// "true" re-requests transitions that are still in progress
    #[arg(default_value = "false")]
    force_run: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let correlation = time::now_microseconds();
    info!(
        correlation,
        "Starting transition scheduler for window {} to {}", args.start_date, args.end_date
    );

    match run(&args).await {
        Ok(report) => {
            info!(
                correlation,
                "Scheduler finished: {} users scanned, {} item requests, {} revision requests, {} skipped",
                report.users_scanned,
                report.items_requested,
                report.revisions_requested,
                report.users_skipped
            );
        }
        Err(err) => {
            error!(correlation, "Scheduler failed: {:#}", err);
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<SchedulerReport> {
    let start = time::microseconds_from_string(&args.start_date)?;
    let end = time::microseconds_from_string(&args.end_date)?;
    let force_run = args.force_run == "true";

    let primary_pool = sqlite::connect(&SqliteConfig {
        database_path: database_path("QUILLSYNC_PRIMARY_DATABASE", "quillsync-primary.db"),
        ..SqliteConfig::default()
    })
    .await?;
    let secondary_pool = sqlite::connect(&SqliteConfig {
        database_path: database_path("QUILLSYNC_SECONDARY_DATABASE", "quillsync-secondary.db"),
        ..SqliteConfig::default()
    })
    .await?;

    let users = Arc::new(SqliteUserStore::new(primary_pool.clone()).await?);
    let statuses: Arc<dyn TransitionStatusRepository> =
        Arc::new(SqliteTransitionStatusStore::new(primary_pool.clone()).await?);
    let primary_revisions = Arc::new(SqliteRevisionStore::new(primary_pool).await?);
    let secondary_revisions = Arc::new(SqliteRevisionStore::new(secondary_pool).await?);

    let bus = Arc::new(InProcessEventBus::new());
    let migrator = RevisionMigrator::new(
        primary_revisions,
        Some(secondary_revisions),
        Some(Arc::clone(&statuses)),
        bus.clone(),
    );
    bus.register(Arc::new(TransitionRequestedHandler::new(Arc::new(migrator))))
        .await;
    bus.register(Arc::new(TransitionStatusUpdatedHandler::new(Arc::clone(
        &statuses,
    ))))
    .await;

    let scheduler = TransitionScheduler::new(users, statuses, bus.clone());
    let report = scheduler.run(start, end, force_run).await?;
    Ok(report)
}

fn database_path(variable: &str, default: &str) -> PathBuf {
    std::env::var(variable)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
