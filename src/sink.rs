//! Alert sinks
//!
//! The emitter hands every rendered alert to an [`AlertSink`]. Sinks must
//! not block: they run on the packet path.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

/// An alert as delivered to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert<'a> {
    /// Detector (generator) id
    pub generator_id: u32,
    /// Event identity, the alert's sub-identifier
    pub event_id: u32,
    pub revision: u32,
    pub classification: u32,
    pub priority: u32,
    /// Rendered message, at most `MAX_MESSAGE_LEN` bytes
    pub message: &'a str,
    pub flags: u32,
}

/// Alert-sink collaborator
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &Alert<'_>);
}

/// Owned, timestamped copy of an [`Alert`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub generator_id: u32,
    pub event_id: u32,
    pub revision: u32,
    pub classification: u32,
    pub priority: u32,
    pub message: String,
    pub flags: u32,
}

impl AlertRecord {
    pub fn from_alert(alert: &Alert<'_>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            generator_id: alert.generator_id,
            event_id: alert.event_id,
            revision: alert.revision,
            classification: alert.classification,
            priority: alert.priority,
            message: alert.message.to_string(),
            flags: alert.flags,
        }
    }

    /// `gid:sid:rev` signature triple
    pub fn signature(&self) -> String {
        format!("{}:{}:{}", self.generator_id, self.event_id, self.revision)
    }
}

/// Sink that writes alerts to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn emit(&self, alert: &Alert<'_>) {
        warn!(
            gid = alert.generator_id,
            sid = alert.event_id,
            rev = alert.revision,
            priority = alert.priority,
            "[{}:{}:{}] {}",
            alert.generator_id,
            alert.event_id,
            alert.revision,
            alert.message
        );
    }
}

/// Sink that fans alerts out over a broadcast channel
pub struct BroadcastSink {
    tx: broadcast::Sender<AlertRecord>,
}

impl BroadcastSink {
    pub fn new(channel_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertRecord> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl AlertSink for BroadcastSink {
    fn emit(&self, alert: &Alert<'_>) {
        // No receivers is not an error
        let _ = self.tx.send(AlertRecord::from_alert(alert));
    }
}

/// Sink that keeps every alert in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    alerts: Mutex<Vec<AlertRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }

    /// Copy of every alert received so far
    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.alerts.lock().clone()
    }

    /// Remove and return every alert received so far
    pub fn drain(&self) -> Vec<AlertRecord> {
        std::mem::take(&mut *self.alerts.lock())
    }
}

impl AlertSink for MemorySink {
    fn emit(&self, alert: &Alert<'_>) {
        self.alerts.lock().push(AlertRecord::from_alert(alert));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ALERT_CLASSIFICATION, ALERT_PRIORITY, ALERT_REVISION, GENERATOR_DCE2};

    fn make_alert(message: &str) -> Alert<'_> {
        Alert {
            generator_id: GENERATOR_DCE2,
            event_id: 5,
            revision: ALERT_REVISION,
            classification: ALERT_CLASSIFICATION,
            priority: ALERT_PRIORITY,
            message,
            flags: 0,
        }
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.emit(&make_alert("one"));
        sink.emit(&make_alert("two"));

        assert_eq!(sink.len(), 2);
        let alerts = sink.drain();
        assert_eq!(alerts[1].message, "two");
        assert_eq!(alerts[0].signature(), "133:5:1");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast() {
        let sink = BroadcastSink::new(10);
        let mut rx = sink.subscribe();
        assert_eq!(sink.receiver_count(), 1);

        sink.emit(&make_alert("SMB - Bad SMB message type"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_id, 5);
        assert_eq!(received.priority, 3);
        assert_eq!(received.message, "SMB - Bad SMB message type");
    }

    #[test]
    fn test_broadcast_without_receivers() {
        let sink = BroadcastSink::default();
        sink.emit(&make_alert("dropped"));
        assert_eq!(sink.receiver_count(), 0);
    }

    #[test]
    fn test_record_json() {
        let record = AlertRecord::from_alert(&make_alert("msg"));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""generator_id":133"#));
        assert!(json.contains(r#""message":"msg""#));
    }
}
