//! Tokio adapter that owns the recurring trigger and drives sync runs.
//!
//! `TimerScheduler` implements the scheduling boundary: `schedule`
//! replaces the stored trigger (waking the loop if it is mid-sleep),
//! `cancel` clears it. `spawn_sync_loop` is the wake-up source: it
//! sleeps per the stored trigger, consumes one-shots before running,
//! invokes the job, and applies linear retry backoff after failed runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::model::RunResult;
use crate::ports::{ScheduleConstraints, SyncScheduler, Trigger};
use crate::sync::job::SyncJob;

/// In-process trigger store for the sync loop.
pub struct TimerScheduler {
    next: Mutex<Option<Trigger>>,
    changed: Notify,
}

impl TimerScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(None),
            changed: Notify::new(),
        })
    }

    /// The currently stored trigger, if any.
    pub async fn current(&self) -> Option<Trigger> {
        *self.next.lock().await
    }

    /// Clear a one-shot trigger that is about to fire, unless a newer
    /// schedule call already replaced it.
    async fn consume(&self, fired: Trigger) {
        let mut next = self.next.lock().await;
        if *next == Some(fired) {
            *next = None;
        }
    }

    fn wake(&self) {
        self.changed.notify_waiters();
    }
}

#[async_trait]
impl SyncScheduler for TimerScheduler {
    async fn schedule(
        &self,
        trigger: Trigger,
        _constraints: ScheduleConstraints,
    ) -> Result<(), ScheduleError> {
        *self.next.lock().await = Some(trigger);
        self.wake();
        Ok(())
    }

    async fn cancel(&self) -> Result<(), ScheduleError> {
        *self.next.lock().await = None;
        self.wake();
        Ok(())
    }
}

/// Handle to a running sync loop.
pub struct SyncLoopHandle {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
    timer: Arc<TimerScheduler>,
}

impl SyncLoopHandle {
    /// Ask the loop to stop and wait for it to finish.
    pub async fn shutdown(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.timer.wake();
        let _ = self.handle.await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawn the background task that waits on the stored trigger and runs
/// the job.
///
/// One run at a time; a schedule replacement mid-sleep restarts the
/// wait with the new trigger. After a failed run the next wake uses
/// linear backoff (`initial_backoff × consecutive failures`, capped at
/// the trigger's own delay), resetting on the first non-failed run.
pub fn spawn_sync_loop(
    job: Arc<SyncJob>,
    timer: Arc<TimerScheduler>,
    constraints: ScheduleConstraints,
) -> SyncLoopHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let loop_timer = Arc::clone(&timer);

    let handle = tokio::spawn(async move {
        info!("Sync loop started");
        let mut consecutive_failures: u32 = 0;

        loop {
            if flag.load(Ordering::Relaxed) {
                info!("Sync loop shutting down");
                return;
            }

            let Some(trigger) = loop_timer.current().await else {
                // Nothing scheduled — wait for schedule(), cancel(), or
                // shutdown to wake us.
                loop_timer.changed.notified().await;
                continue;
            };

            let delay = if consecutive_failures > 0 {
                let backoff = constraints.initial_backoff * consecutive_failures;
                backoff.min(trigger.delay())
            } else {
                trigger.delay()
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if flag.load(Ordering::Relaxed) {
                        info!("Sync loop shutting down");
                        return;
                    }
                    if matches!(trigger, Trigger::OneShot(_)) {
                        loop_timer.consume(trigger).await;
                    }

                    let result = job.run().await;
                    match result {
                        RunResult::Failed => {
                            consecutive_failures += 1;
                            debug!(consecutive_failures, "Run failed — backing off");
                        }
                        _ => consecutive_failures = 0,
                    }
                    info!(?result, "Sync run finished");
                }
                _ = loop_timer.changed.notified() => {
                    // Trigger replaced or cancelled — re-read it.
                }
            }
        }
    });

    SyncLoopHandle {
        handle,
        shutdown,
        timer,
    }
}
