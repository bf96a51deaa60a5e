//! Sync job — one run from trigger to completion.
//!
//! Flow: session gate → fetch page 0 → clear presented alerts → persist
//! (errors swallowed) → enrichment pipeline → recompute interval →
//! reschedule. Returning from `run` is the completion signal; every exit
//! path reaches it exactly once.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::model::RunResult;
use crate::ports::{
    AlertSink, IntervalSource, NotificationFeed, ScheduleConstraints, SessionGate, SyncScheduler,
    ThreadStore,
};
use crate::sync::enrich::EnrichmentPipeline;
use crate::sync::interval::{IntervalPolicy, ScheduleRequest};

/// Collaborators injected into the sync job.
pub struct SyncDeps {
    pub session: Arc<dyn SessionGate>,
    pub feed: Arc<dyn NotificationFeed>,
    pub store: Arc<dyn ThreadStore>,
    pub alerts: Arc<dyn AlertSink>,
    pub scheduler: Arc<dyn SyncScheduler>,
    pub intervals: Arc<dyn IntervalSource>,
}

/// Orchestrates one sync run. Non-reentrant per schedule slot — the
/// scheduler guarantees no overlapping invocation.
pub struct SyncJob {
    deps: SyncDeps,
    policy: IntervalPolicy,
    pipeline: EnrichmentPipeline,
}

impl SyncJob {
    pub fn new(deps: SyncDeps, config: SyncConfig) -> Self {
        let policy = IntervalPolicy::new(&config);
        let pipeline =
            EnrichmentPipeline::new(Arc::clone(&deps.feed), Arc::clone(&deps.alerts), config);
        Self {
            deps,
            policy,
            pipeline,
        }
    }

    /// Execute one run.
    pub async fn run(&self) -> RunResult {
        if !self.deps.session.is_authenticated().await {
            debug!("No authenticated session — skipping run");
            return RunResult::Success;
        }

        let threads = match self.deps.feed.notifications(0).await {
            Ok(threads) => threads,
            Err(err) => {
                warn!(error = %err, "Notification fetch failed");
                // Never leave stale alerts showing outdated state.
                self.deps.alerts.clear_all().await;
                return RunResult::Failed;
            }
        };

        info!(threads = threads.len(), "Fetched notification page");

        // Full-refresh model: the presented set is rebuilt from this
        // fetch, never incrementally patched.
        self.deps.alerts.clear_all().await;

        // Fire-and-forget persistence — a failed save never blocks
        // presentation, but it completes before enrichment begins.
        if let Err(err) = self.deps.store.save(&threads).await {
            warn!(error = %err, "Failed to persist fetched threads");
        }

        let report = self.pipeline.run(&threads).await;
        info!(
            selected = report.selected,
            presented = report.presented,
            failed = report.failed,
            "Enrichment finished"
        );

        self.reschedule().await;

        if report.failed > 0 {
            RunResult::Partial
        } else {
            RunResult::Success
        }
    }

    /// Recompute the next trigger and hand it to the scheduler.
    async fn reschedule(&self) {
        let configured = self.deps.intervals.configured_interval().await;
        match self.policy.next_schedule(configured) {
            ScheduleRequest::Set(trigger) => {
                debug!(?trigger, "Rescheduling");
                if let Err(err) = self
                    .deps
                    .scheduler
                    .schedule(trigger, ScheduleConstraints::default())
                    .await
                {
                    warn!(error = %err, "Failed to reschedule");
                }
            }
            ScheduleRequest::Cancel => {
                debug!("Polling disabled — cancelling trigger");
                if let Err(err) = self.deps.scheduler.cancel().await {
                    warn!(error = %err, "Failed to cancel trigger");
                }
            }
        }
    }
}
