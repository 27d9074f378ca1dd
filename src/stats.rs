//! Alert statistics
//!
//! Counters are bumped for every alert that passes the class filter, before
//! the message is rendered.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::types::EventId;

/// Statistics collaborator
pub trait AlertStats: Send + Sync {
    fn increment_events(&self, id: EventId);
}

/// Atomic event counters, total and per identity
#[derive(Debug)]
pub struct EventStats {
    events: AtomicU64,
    per_event: Vec<AtomicU64>,
}

impl EventStats {
    pub fn new() -> Self {
        Self {
            events: AtomicU64::new(0),
            per_event: (0..EventId::COUNT).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Total alerts counted
    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    /// Alerts counted for one identity
    pub fn count(&self, id: EventId) -> u64 {
        self.per_event[id.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> EventStatsSnapshot {
        let per_event = EventId::ALL
            .iter()
            .filter_map(|&id| {
                let n = self.count(id);
                (n > 0).then_some((id, n))
            })
            .collect();

        EventStatsSnapshot {
            events: self.events(),
            per_event,
        }
    }
}

impl Default for EventStats {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertStats for EventStats {
    fn increment_events(&self, id: EventId) {
        self.events.fetch_add(1, Ordering::Relaxed);
        self.per_event[id.index()].fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`EventStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventStatsSnapshot {
    pub events: u64,
    /// Identities with a non-zero count, in identity order
    pub per_event: Vec<(EventId, u64)>,
}
