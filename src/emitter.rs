//! Alert emission
//!
//! The entry point protocol parsers call when they see an anomaly. Each
//! packet-processing worker owns its own [`AlertEmitter`]; the registry and
//! name tables are shared read-only, while the per-event scratch buffers live
//! in the emitter so two workers never render into the same buffer.

use tracing::{debug, trace};

use crate::event::Dce2Event;
use crate::filter::ClassFilter;
use crate::format::{render, EventArg, MessageBuffer};
use crate::names::NameTables;
use crate::registry::EventRegistry;
use crate::session::SessionAlertState;
use crate::sink::{Alert, AlertSink};
use crate::stats::AlertStats;
use crate::types::{
    EventId, ALERT_CLASSIFICATION, ALERT_PRIORITY, ALERT_REVISION, GENERATOR_DCE2,
};

/// What happened to a raised event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Delivered to the sink
    Emitted,
    /// The session already alerted on this event
    Deduplicated,
    /// The event's class is disabled
    Filtered,
    /// The identity is not in the registry (e.g. after teardown)
    Unregistered,
}

impl AlertOutcome {
    pub fn is_emitted(&self) -> bool {
        matches!(self, AlertOutcome::Emitted)
    }
}

/// Per-worker alert emitter
pub struct AlertEmitter<'a> {
    registry: &'a EventRegistry,
    names: &'a NameTables,
    filter: &'a dyn ClassFilter,
    stats: &'a dyn AlertStats,
    sink: &'a dyn AlertSink,
    buffers: Vec<MessageBuffer>,
}

impl<'a> AlertEmitter<'a> {
    pub fn new(
        registry: &'a EventRegistry,
        names: &'a NameTables,
        filter: &'a dyn ClassFilter,
        stats: &'a dyn AlertStats,
        sink: &'a dyn AlertSink,
    ) -> Self {
        Self {
            registry,
            names,
            filter,
            stats,
            sink,
            buffers: vec![MessageBuffer::new(); registry.len()],
        }
    }

    /// Name tables used to render command and PDU type names
    pub fn names(&self) -> &'a NameTables {
        self.names
    }

    /// Raise a typed event
    pub fn raise(
        &mut self,
        session: Option<&mut SessionAlertState>,
        event: &Dce2Event<'_>,
    ) -> AlertOutcome {
        let names = self.names;
        let args = event.args(names);
        self.alert(session, event.id(), &args)
    }

    /// Raise `id` with positional template arguments
    ///
    /// `args` must match the placeholders of the event's template; prefer
    /// [`raise`](Self::raise), which guarantees that. Pass `None` for
    /// `session` when no session applies (e.g. memcap events): such calls
    /// are never deduplicated.
    pub fn alert(
        &mut self,
        session: Option<&mut SessionAlertState>,
        id: EventId,
        args: &[EventArg<'_>],
    ) -> AlertOutcome {
        // The session bit is set before the class filter runs: an event
        // filtered out still uses up the session's one alert for that kind,
        // even if the class is enabled later. Keep this order.
        if let Some(session) = session {
            if session.test_and_set(id) {
                return AlertOutcome::Deduplicated;
            }
        }

        let registry = self.registry;
        let Some(descriptor) = registry.lookup(id) else {
            return AlertOutcome::Unregistered;
        };

        if !self.filter.is_enabled(descriptor.class) {
            return AlertOutcome::Filtered;
        }

        self.stats.increment_events(id);

        let Some(buf) = self.buffers.get_mut(id.index()) else {
            return AlertOutcome::Unregistered;
        };
        render(&descriptor.rendered, args, buf);
        if buf.is_truncated() {
            trace!("alert {} truncated to {} bytes", id, buf.len());
        }

        debug!("DCE2 Alert => {}", buf.as_str());

        self.sink.emit(&Alert {
            generator_id: GENERATOR_DCE2,
            event_id: id.as_u32(),
            revision: ALERT_REVISION,
            classification: ALERT_CLASSIFICATION,
            priority: ALERT_PRIORITY,
            message: buf.as_str(),
            flags: 0,
        });

        AlertOutcome::Emitted
    }

    /// Last message rendered for `id` by this emitter
    pub fn last_message(&self, id: EventId) -> Option<&str> {
        self.buffers.get(id.index()).map(MessageBuffer::as_str)
    }
}
