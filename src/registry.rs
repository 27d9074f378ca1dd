//! Event registry
//!
//! Materializes the catalog into descriptors whose message template carries
//! the detector prefix, e.g. `"(dcerpc2) SMB - %s: Bad word count: %u"`.
//! Built once at startup and read-only afterwards.

use tracing::debug;

use crate::catalog::{CatalogEntry, CATALOG};
use crate::error::{Error, Result};
use crate::memory::{MemType, MemoryTracker};
use crate::types::{EventClass, EventId, DETECTOR_PREFIX_MAX};

/// A registered event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    /// Identity, equal to the descriptor's position
    pub id: u32,
    /// Alert class used for filtering
    pub class: EventClass,
    /// Template as authored
    pub template: &'static str,
    /// `"(" + detector name + ") " + template`
    pub rendered: String,
}

impl EventDescriptor {
    /// Bytes reserved for the rendered template
    fn reserved_size(&self) -> usize {
        self.rendered.len() + 1
    }
}

/// Registry of every event the detector can raise
#[derive(Debug)]
pub struct EventRegistry {
    detector_name: String,
    descriptors: Vec<EventDescriptor>,
}

impl EventRegistry {
    /// Build the registry from the built-in catalog
    pub fn new(detector_name: &str, mem: &dyn MemoryTracker) -> Result<Self> {
        Self::from_catalog(detector_name, &CATALOG, mem)
    }

    /// Build the registry from `catalog`
    ///
    /// Fails if any entry's identity differs from its position, if memory
    /// cannot be reserved, or if a rendered template comes out short.
    pub fn from_catalog(
        detector_name: &str,
        catalog: &[CatalogEntry],
        mem: &dyn MemoryTracker,
    ) -> Result<Self> {
        let prefix = format!("({}) ", detector_name);
        if prefix.len() > DETECTOR_PREFIX_MAX {
            return Err(Error::DetectorNameTooLong {
                len: prefix.len(),
                max: DETECTOR_PREFIX_MAX,
            });
        }

        let mut registry = Self {
            detector_name: detector_name.to_string(),
            descriptors: Vec::with_capacity(catalog.len()),
        };

        for (position, entry) in catalog.iter().enumerate() {
            if let Err(e) = registry.register(position, entry, &prefix, mem) {
                registry.teardown(mem);
                return Err(e);
            }
        }

        debug!(
            "registered {} events for detector {}",
            registry.descriptors.len(),
            registry.detector_name
        );
        Ok(registry)
    }

    fn register(
        &mut self,
        position: usize,
        entry: &CatalogEntry,
        prefix: &str,
        mem: &dyn MemoryTracker,
    ) -> Result<()> {
        // Lookups index by identity, so a misordered catalog would alert
        // with the wrong message. Never remove this check.
        if entry.identity as usize != position {
            return Err(Error::CatalogOrder {
                position,
                identity: entry.identity,
            });
        }

        let size = prefix.len() + entry.template.len() + 1;
        if !mem.reserve(size, MemType::Init) {
            return Err(Error::Alloc {
                size,
                tag: MemType::Init,
            });
        }

        let mut rendered = String::with_capacity(size - 1);
        rendered.push_str(prefix);
        rendered.push_str(entry.template);
        if rendered.len() != size - 1 {
            mem.release(size, MemType::Init);
            return Err(Error::TemplateTruncated {
                position,
                expected: size - 1,
                got: rendered.len(),
            });
        }

        self.descriptors.push(EventDescriptor {
            id: entry.identity,
            class: entry.class,
            template: entry.template,
            rendered,
        });
        Ok(())
    }

    /// Descriptor for `id`, or `None` after teardown
    pub fn lookup(&self, id: EventId) -> Option<&EventDescriptor> {
        self.descriptors.get(id.index())
    }

    /// Number of registered events
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.descriptors.iter()
    }

    pub fn detector_name(&self) -> &str {
        &self.detector_name
    }

    /// Release every rendered template; repeated calls do nothing
    pub fn teardown(&mut self, mem: &dyn MemoryTracker) {
        for descriptor in self.descriptors.drain(..) {
            mem.release(descriptor.reserved_size(), MemType::Init);
        }
    }
}
