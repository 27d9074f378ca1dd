//! Process lifecycle
//!
//! [`Dce2Events::init`] builds the name tables and the event registry once
//! at startup; [`Dce2Events::teardown`] releases them. Workers borrow the
//! built tables through [`Dce2Events::emitter`], so the borrow checker keeps
//! teardown after the last alert.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::emitter::AlertEmitter;
use crate::error::{Error, Result};
use crate::filter::ClassFilter;
use crate::memory::{MemCap, MemoryTracker};
use crate::names::NameTables;
use crate::registry::EventRegistry;
use crate::session::SessionAlertState;
use crate::sink::AlertSink;
use crate::stats::AlertStats;

/// Owner of the process-wide event tables
pub struct Dce2Events {
    mem: Arc<dyn MemoryTracker>,
    names: Option<NameTables>,
    registry: Option<EventRegistry>,
}

impl Dce2Events {
    /// Build the name tables, then the registry
    pub fn init(config: &Config, mem: Arc<dyn MemoryTracker>) -> Result<Self> {
        config.validate()?;
        let mut names = NameTables::new(mem.as_ref())?;

        let registry = match EventRegistry::new(&config.detector.name, mem.as_ref()) {
            Ok(registry) => registry,
            Err(e) => {
                names.teardown(mem.as_ref());
                return Err(e);
            }
        };

        info!(
            "{} events registered for {}",
            registry.len(),
            registry.detector_name()
        );

        Ok(Self {
            mem,
            names: Some(names),
            registry: Some(registry),
        })
    }

    /// Build from configuration with a [`MemCap`] sized by `memory.memcap`
    pub fn from_config(config: &Config) -> Result<Self> {
        let mem: Arc<dyn MemoryTracker> = Arc::new(MemCap::new(config.memory.memcap));
        Self::init(config, mem)
    }

    /// Like [`from_config`](Self::from_config), but a failure ends the process
    pub fn init_or_die(config: &Config) -> Self {
        match Self::from_config(config) {
            Ok(events) => events,
            Err(e) => die(&e),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    pub fn registry(&self) -> Option<&EventRegistry> {
        self.registry.as_ref()
    }

    pub fn names(&self) -> Option<&NameTables> {
        self.names.as_ref()
    }

    pub fn memory(&self) -> &Arc<dyn MemoryTracker> {
        &self.mem
    }

    /// Alert state for a new session, sized to the registry
    pub fn new_session(&self) -> SessionAlertState {
        self.registry
            .as_ref()
            .map(SessionAlertState::for_registry)
            .unwrap_or_default()
    }

    /// Emitter for one worker, or `None` after teardown
    pub fn emitter<'a>(
        &'a self,
        filter: &'a dyn ClassFilter,
        stats: &'a dyn AlertStats,
        sink: &'a dyn AlertSink,
    ) -> Option<AlertEmitter<'a>> {
        let registry = self.registry.as_ref()?;
        let names = self.names.as_ref()?;
        Some(AlertEmitter::new(registry, names, filter, stats, sink))
    }

    /// Release everything `init` built; repeated calls do nothing
    pub fn teardown(&mut self) {
        if let Some(mut registry) = self.registry.take() {
            registry.teardown(self.mem.as_ref());
        }
        if let Some(mut names) = self.names.take() {
            names.teardown(self.mem.as_ref());
        }
    }
}

impl Drop for Dce2Events {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Report a startup failure and end the process
pub fn die(err: &Error) -> ! {
    error!("dcerpc2 event subsystem failed to start: {}", err);
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
