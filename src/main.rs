use std::sync::Arc;

use octowatch::alerts::model::AlertEvent;
use octowatch::alerts::AlertCenter;
use octowatch::config::{EnvIntervals, SyncConfig};
use octowatch::github::{GithubFeed, GithubSession};
use octowatch::ports::{
    AlertSink, IntervalSource, ScheduleConstraints, SyncScheduler, ThreadStore,
};
use octowatch::store::LibSqlStore;
use octowatch::sync::interval::{IntervalPolicy, ScheduleRequest};
use octowatch::sync::{SyncDeps, SyncJob, TimerScheduler, spawn_sync_loop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let db_path = std::env::var("OCTOWATCH_DB_PATH")
        .unwrap_or_else(|_| "./data/octowatch.db".to_string());

    let platform_min_secs: Option<u64> = std::env::var("OCTOWATCH_MIN_PERIOD_SECS")
        .ok()
        .and_then(|raw| raw.parse().ok());

    let config = SyncConfig {
        platform_min_period: platform_min_secs.map(std::time::Duration::from_secs),
        ..SyncConfig::default()
    };

    eprintln!("🔭 octowatch v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", db_path);
    eprintln!("   Baseline interval: {:?}", config.baseline_interval);

    let session = Arc::new(GithubSession::from_env());
    let feed = Arc::new(GithubFeed::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export GITHUB_TOKEN=ghp_...");
        std::process::exit(1);
    }));

    let store: Arc<dyn ThreadStore> = Arc::new(
        LibSqlStore::new_local(std::path::Path::new(&db_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open database at {}: {}", db_path, e);
                std::process::exit(1);
            }),
    );

    let alerts = AlertCenter::new();
    let timer = TimerScheduler::new();
    let intervals = Arc::new(EnvIntervals::new());

    // Display subsystem stand-in: log every presentation event.
    let mut events = alerts.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AlertEvent::Presented { alert } => {
                    tracing::info!(
                        id = %alert.id,
                        title = %alert.title,
                        summary = alert.group_summary,
                        "Alert"
                    );
                }
                AlertEvent::Cleared => tracing::info!("Alerts cleared"),
            }
        }
    });

    let job = Arc::new(SyncJob::new(
        SyncDeps {
            session,
            feed,
            store,
            alerts: Arc::clone(&alerts) as Arc<dyn AlertSink>,
            scheduler: Arc::clone(&timer) as Arc<dyn SyncScheduler>,
            intervals: Arc::clone(&intervals) as Arc<dyn IntervalSource>,
        },
        config.clone(),
    ));

    // Install the initial trigger, then let each run reschedule itself.
    let policy = IntervalPolicy::new(&config);
    match policy.next_schedule(intervals.configured_interval().await) {
        ScheduleRequest::Set(trigger) => {
            eprintln!("   First poll: {:?}\n", trigger.delay());
            timer
                .schedule(trigger, ScheduleConstraints::default())
                .await?;
        }
        ScheduleRequest::Cancel => {
            eprintln!("   Polling disabled (OCTOWATCH_INTERVAL_SECS=-1)\n");
        }
    }

    let loop_handle = spawn_sync_loop(job, Arc::clone(&timer), ScheduleConstraints::default());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    loop_handle.shutdown().await;

    Ok(())
}
