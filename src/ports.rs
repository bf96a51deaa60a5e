//! Collaborator boundaries — async traits injected into the sync engine.
//!
//! The engine owns none of the machinery behind these: the feed is a REST
//! client, the store a database, the sink whatever renders alerts, the
//! scheduler whatever wakes the process. Everything is consumed as
//! `Arc<dyn …>` so tests can substitute recording mocks.

use std::time::Duration;

use async_trait::async_trait;

use crate::alerts::model::AlertPayload;
use crate::error::{FeedError, ScheduleError, StoreError};
use crate::model::{Comment, NotificationThread};

// ── Feed ────────────────────────────────────────────────────────────

/// Remote notification feed.
#[async_trait]
pub trait NotificationFeed: Send + Sync {
    /// Fetch one page of notification threads.
    async fn notifications(&self, page: u32) -> Result<Vec<NotificationThread>, FeedError>;

    /// Fetch a single comment by its API URL.
    async fn comment(&self, url: &str) -> Result<Comment, FeedError>;
}

// ── Persistence ─────────────────────────────────────────────────────

/// Local persistence for fetched threads.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Upsert all threads by id — last fetch wins.
    async fn save(&self, threads: &[NotificationThread]) -> Result<(), StoreError>;
}

// ── Presentation ────────────────────────────────────────────────────

/// The presented-alert set. `present` upserts by the payload's target id,
/// so a re-presented alert updates in place rather than duplicating.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Remove every presented alert. Safe to call when nothing is shown.
    async fn clear_all(&self);

    /// Present (or update) one alert.
    async fn present(&self, alert: AlertPayload);
}

// ── Scheduling ──────────────────────────────────────────────────────

/// A wake request for the scheduling boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire repeatedly at this interval until replaced or cancelled.
    Periodic(Duration),
    /// Fire once after this delay, then forget.
    OneShot(Duration),
}

impl Trigger {
    /// Delay until the next fire.
    pub fn delay(&self) -> Duration {
        match self {
            Trigger::Periodic(d) | Trigger::OneShot(d) => *d,
        }
    }
}

/// Fixed requirements attached to every schedule request.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConstraints {
    /// Only fire when the network is reachable.
    pub requires_network: bool,
    /// Keep the schedule across process restarts.
    pub persisted: bool,
    /// Initial delay for linear retry backoff.
    pub initial_backoff: Duration,
}

impl Default for ScheduleConstraints {
    fn default() -> Self {
        Self {
            requires_network: true,
            persisted: true,
            initial_backoff: Duration::from_secs(30),
        }
    }
}

/// The recurring-trigger owner.
#[async_trait]
pub trait SyncScheduler: Send + Sync {
    /// Replace the current trigger.
    async fn schedule(
        &self,
        trigger: Trigger,
        constraints: ScheduleConstraints,
    ) -> Result<(), ScheduleError>;

    /// Drop the current trigger entirely.
    async fn cancel(&self) -> Result<(), ScheduleError>;
}

// ── Session ─────────────────────────────────────────────────────────

/// User/session state.
#[async_trait]
pub trait SessionGate: Send + Sync {
    /// Whether an authenticated session exists. A signed-out user turns
    /// the whole run into a no-op.
    async fn is_authenticated(&self) -> bool;
}

// ── Interval configuration ──────────────────────────────────────────

/// User-configured polling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSetting {
    /// Nothing configured — use the baseline.
    Unset,
    /// Poll every `Duration`. Zero falls back to the baseline.
    Every(Duration),
    /// Polling turned off — cancel the recurring trigger.
    Disabled,
}

/// Storage for the user-configured polling interval.
#[async_trait]
pub trait IntervalSource: Send + Sync {
    async fn configured_interval(&self) -> IntervalSetting;
}
