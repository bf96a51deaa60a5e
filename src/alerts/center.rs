//! Alert center — the in-memory presented-alert set with broadcast to
//! display-subsystem subscribers.
//!
//! This is the engine's view of "what is currently shown": a map keyed
//! by target id (present upserts, clear empties) plus a broadcast
//! channel so whatever renders alerts can follow along in real time.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::alerts::model::{AlertEvent, AlertId, AlertPayload};
use crate::ports::AlertSink;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// In-memory presented-alert set backed by a broadcast channel.
pub struct AlertCenter {
    alerts: RwLock<HashMap<AlertId, AlertPayload>>,
    tx: broadcast::Sender<AlertEvent>,
}

impl AlertCenter {
    /// Create a new, empty alert center.
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            alerts: RwLock::new(HashMap::new()),
            tx,
        })
    }

    /// Subscribe to presentation events.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.tx.subscribe()
    }

    /// Snapshot of the currently presented alerts.
    pub async fn active(&self) -> Vec<AlertPayload> {
        self.alerts.read().await.values().cloned().collect()
    }

    /// Number of currently presented alerts.
    pub async fn len(&self) -> usize {
        self.alerts.read().await.len()
    }

    /// Whether nothing is presented.
    pub async fn is_empty(&self) -> bool {
        self.alerts.read().await.is_empty()
    }

    /// Look up one presented alert by target id.
    pub async fn get(&self, id: &AlertId) -> Option<AlertPayload> {
        self.alerts.read().await.get(id).cloned()
    }
}

#[async_trait]
impl AlertSink for AlertCenter {
    async fn clear_all(&self) {
        let mut alerts = self.alerts.write().await;
        if !alerts.is_empty() {
            debug!(cleared = alerts.len(), "Clearing presented alerts");
        }
        alerts.clear();
        drop(alerts);

        // Broadcast — ok if no receivers are listening
        let _ = self.tx.send(AlertEvent::Cleared);
    }

    async fn present(&self, alert: AlertPayload) {
        debug!(id = %alert.id, title = %alert.title, "Presenting alert");

        let msg = AlertEvent::Presented {
            alert: alert.clone(),
        };
        {
            let mut alerts = self.alerts.write().await;
            alerts.insert(alert.id.clone(), alert);
        }

        let _ = self.tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::alerts::model::ALERT_GROUP;

    fn payload(id: AlertId, title: &str) -> AlertPayload {
        AlertPayload {
            id,
            title: title.to_string(),
            body: "body".to_string(),
            timestamp: Utc::now(),
            accent: 0x1976D2,
            long_form: false,
            group: ALERT_GROUP.to_string(),
            group_summary: false,
            actions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn present_upserts_by_target_id() {
        let center = AlertCenter::new();
        let id = AlertId::Thread("1".to_string());

        center.present(payload(id.clone(), "first")).await;
        center.present(payload(id.clone(), "second")).await;

        assert_eq!(center.len().await, 1);
        assert_eq!(center.get(&id).await.unwrap().title, "second");
    }

    #[tokio::test]
    async fn clear_all_empties_the_set_and_is_idempotent() {
        let center = AlertCenter::new();
        center
            .present(payload(AlertId::Thread("1".to_string()), "a"))
            .await;
        center.present(payload(AlertId::Summary, "s")).await;

        center.clear_all().await;
        assert!(center.is_empty().await);

        // Safe even when nothing is shown.
        center.clear_all().await;
        assert!(center.is_empty().await);
    }

    #[tokio::test]
    async fn subscribers_see_present_and_clear_events() {
        let center = AlertCenter::new();
        let mut rx = center.subscribe();

        center
            .present(payload(AlertId::Thread("1".to_string()), "a"))
            .await;
        center.clear_all().await;

        match rx.recv().await.unwrap() {
            AlertEvent::Presented { alert } => assert_eq!(alert.title, "a"),
            other => panic!("Expected Presented, got {:?}", other),
        }
        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Cleared));
    }
}
