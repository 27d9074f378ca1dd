//! DCE/RPC detector event subsystem
//!
//! Turns anomalies found by the SMB and DCE/RPC parsers into alerts:
//! a fixed catalog of 44 events, rendered once at startup with a
//! `"(dcerpc2) "` prefix, then filtered per event class, deduplicated per
//! session, counted, and handed to an [`AlertSink`].
//!
//! ```no_run
//! use dce2_events::{Config, Dce2Event, Dce2Events, EventStats, SharedClassFilter, TracingSink};
//!
//! let config = Config::default();
//! let events = Dce2Events::init_or_die(&config);
//!
//! let filter = SharedClassFilter::new(config.events.enabled);
//! let stats = EventStats::new();
//! let sink = TracingSink;
//!
//! let mut emitter = events.emitter(&filter, &stats, &sink).unwrap();
//! let mut session = events.new_session();
//! emitter.raise(Some(&mut session), &Dce2Event::SmbBadId);
//! ```

pub mod catalog;
pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod filter;
pub mod format;
pub mod lifecycle;
pub mod logging;
pub mod memory;
pub mod names;
pub mod registry;
pub mod session;
pub mod sink;
pub mod stats;
pub mod types;

pub use catalog::{CatalogEntry, CATALOG};
pub use config::{Config, LoggingConfig};
pub use emitter::{AlertEmitter, AlertOutcome};
pub use error::{Error, Result};
pub use event::{Dce2Event, EventArgs};
pub use filter::{ClassFilter, EventClassSet, SharedClassFilter};
pub use format::{EventArg, MessageBuffer};
pub use lifecycle::{die, Dce2Events};
pub use logging::init_logging;
pub use memory::{MemCap, MemType, MemoryTracker};
pub use names::{NameTables, PduType};
pub use registry::{EventDescriptor, EventRegistry};
pub use session::SessionAlertState;
pub use sink::{Alert, AlertRecord, AlertSink, BroadcastSink, MemorySink, TracingSink};
pub use stats::{AlertStats, EventStats, EventStatsSnapshot};
pub use types::{EventClass, EventId, GENERATOR_DCE2};
