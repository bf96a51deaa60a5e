//! Alert composition — pure builders from thread/comment data.

use chrono::Utc;

use crate::alerts::model::{ALERT_GROUP, AlertAction, AlertId, AlertPayload};
use crate::model::{Comment, NotificationThread};

/// Alert for an unread thread whose latest comment was fetched.
///
/// Title is the comment author (empty for deleted accounts), body the
/// comment text rendered long-form, timestamp the comment's creation
/// time. Keyed by thread id so a newer comment on the same thread
/// updates the existing alert.
pub fn with_comment(thread: &NotificationThread, comment: &Comment, accent: u32) -> AlertPayload {
    AlertPayload {
        id: AlertId::Thread(thread.id.clone()),
        title: comment.author().to_string(),
        body: comment.body.clone(),
        timestamp: comment.created_at,
        accent,
        long_form: true,
        group: ALERT_GROUP.to_string(),
        group_summary: false,
        actions: thread_actions(thread),
    }
}

/// Alert for an unread thread without a latest comment.
///
/// Title is the subject title, body the repository name, timestamp the
/// thread's last update (now, when the feed omitted it).
pub fn without_comment(thread: &NotificationThread, accent: u32) -> AlertPayload {
    AlertPayload {
        id: AlertId::Thread(thread.id.clone()),
        title: thread.subject.title.clone(),
        body: thread.repository.full_name.clone(),
        timestamp: thread.updated_at.unwrap_or_else(Utc::now),
        accent,
        long_form: false,
        group: ALERT_GROUP.to_string(),
        group_summary: false,
        actions: thread_actions(thread),
    }
}

/// The group-summary alert, emitted once at the end of any run that
/// presented at least one per-item alert.
pub fn group_summary(accent: u32) -> AlertPayload {
    AlertPayload {
        id: AlertId::Summary,
        title: "Notifications".to_string(),
        body: "You have unread notifications".to_string(),
        timestamp: Utc::now(),
        accent,
        long_form: false,
        group: ALERT_GROUP.to_string(),
        group_summary: true,
        actions: Vec::new(),
    }
}

fn thread_actions(thread: &NotificationThread) -> Vec<AlertAction> {
    vec![
        AlertAction::Open {
            thread_id: thread.id.clone(),
            url: thread.subject.url.clone(),
        },
        AlertAction::MarkAsRead {
            thread_id: thread.id.clone(),
            url: thread.subject.url.clone(),
        },
    ]
}
