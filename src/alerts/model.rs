//! Alert data model — payloads, target ids, and broadcast event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group tag shared by every alert so platforms that collapse grouped
/// alerts stack ours together.
pub const ALERT_GROUP: &str = "octowatch";

/// Addressing key for one presented alert. Presenting the same id again
/// updates the displayed alert instead of adding a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertId {
    /// Per-thread alert. Keyed by thread id so successive comments on
    /// one thread update a single alert.
    Thread(String),
    /// The synthetic group-summary alert. At most one per run.
    Summary,
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thread(id) => write!(f, "thread:{id}"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// User action attached to an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AlertAction {
    /// Open the thread subject.
    Open { thread_id: String, url: String },
    /// Mark the thread read without opening it.
    MarkAsRead { thread_id: String, url: String },
}

/// One alert, ready for the presentation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Target id for update/cancel addressing.
    pub id: AlertId,
    /// Alert title.
    pub title: String,
    /// Alert body.
    pub body: String,
    /// Displayed timestamp.
    pub timestamp: DateTime<Utc>,
    /// Accent color (0xRRGGBB).
    pub accent: u32,
    /// Render the body as expandable long-form text.
    pub long_form: bool,
    /// Group tag for platforms that collapse grouped alerts.
    pub group: String,
    /// Whether this is the group's summary entry.
    pub group_summary: bool,
    /// Actions offered on the alert.
    pub actions: Vec<AlertAction>,
}

/// Event broadcast to display-subsystem subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AlertEvent {
    /// An alert was presented or updated.
    Presented { alert: AlertPayload },
    /// The whole presented set was cleared.
    Cleared,
}
