//! Domain types for the notification feed.
//!
//! Shapes follow the GitHub REST notification API. Threads are persisted
//! with upsert-by-id semantics (last fetch wins); comments are ephemeral —
//! fetched per run and discarded after alert composition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Notification thread ─────────────────────────────────────────────

/// One notification thread from the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationThread {
    /// Server-assigned thread id. Unique per thread, stable across fetches.
    pub id: String,
    /// Whether the thread is unread per the latest fetch. Server state —
    /// never guessed locally.
    pub unread: bool,
    /// When the thread last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// What the thread is about.
    pub subject: Subject,
    /// The repository the thread belongs to.
    pub repository: Repository,
}

/// Subject of a notification thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Thread title (issue/PR title, release name, …).
    pub title: String,
    /// API URL of the subject.
    pub url: String,
    /// API URL of the most recent comment, if any.
    #[serde(default)]
    pub latest_comment_url: Option<String>,
}

/// Repository summary attached to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// "owner/name".
    pub full_name: String,
}

impl NotificationThread {
    /// The latest-comment URL, treating an empty string as absent.
    pub fn latest_comment_url(&self) -> Option<&str> {
        self.subject
            .latest_comment_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

// ── Comment ─────────────────────────────────────────────────────────

/// The latest comment on a thread. Fetched per run during enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Server-assigned comment id.
    pub id: u64,
    /// Comment author. Absent for ghost/deleted accounts.
    #[serde(default)]
    pub user: Option<CommentAuthor>,
    /// Comment body text.
    pub body: String,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}

/// Author handle on a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
}

impl Comment {
    /// Author login, or empty string when the account is gone.
    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("")
    }
}

// ── Run result ──────────────────────────────────────────────────────

/// Outcome of one sync run. Decides reschedule vs retry-sooner in the
/// runner; nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    /// The run finished cleanly. Includes the signed-out no-op.
    Success,
    /// The run finished but some comment fetches failed; alerts were
    /// presented for the rest.
    Partial,
    /// The primary notification fetch failed. Presented alerts were
    /// cleared and no new ones appeared.
    Failed,
}
