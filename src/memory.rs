//! Tagged memory accounting
//!
//! The registry and name tables own ordinary Rust strings, but every byte
//! they hold is reserved against a [`MemoryTracker`] first so the host can
//! enforce a memcap and see what the detector keeps resident. A refused
//! reservation during startup is fatal.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Accounting tag for a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemType {
    /// Process-lifetime data built at startup
    Init,
    /// Per-session state
    Session,
    /// Anything else counted against the memcap
    Memcap,
}

impl MemType {
    fn slot(&self) -> usize {
        match self {
            MemType::Init => 0,
            MemType::Session => 1,
            MemType::Memcap => 2,
        }
    }
}

impl std::fmt::Display for MemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemType::Init => write!(f, "init"),
            MemType::Session => write!(f, "session"),
            MemType::Memcap => write!(f, "memcap"),
        }
    }
}

/// Allocator collaborator
pub trait MemoryTracker: Send + Sync {
    /// Reserve `size` bytes under `tag`, returning false if refused
    fn reserve(&self, size: usize, tag: MemType) -> bool;

    /// Return `size` bytes previously reserved under `tag`
    fn release(&self, size: usize, tag: MemType);
}

/// Memory tracker with per-tag counters and an optional global cap
#[derive(Debug, Default)]
pub struct MemCap {
    /// Global cap in bytes, 0 means unlimited
    cap: u64,
    allocated: [AtomicU64; 3],
    total: AtomicU64,
}

impl MemCap {
    /// Create a tracker with a global cap (0 = unlimited)
    pub fn new(cap: u64) -> Self {
        Self {
            cap,
            ..Self::default()
        }
    }

    /// Create a tracker with no cap
    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// Bytes currently reserved under `tag`
    pub fn allocated(&self, tag: MemType) -> u64 {
        self.allocated[tag.slot()].load(Ordering::Relaxed)
    }

    /// Bytes currently reserved across all tags
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Configured cap (0 = unlimited)
    pub fn cap(&self) -> u64 {
        self.cap
    }
}

impl MemoryTracker for MemCap {
    fn reserve(&self, size: usize, tag: MemType) -> bool {
        let size = size as u64;
        let reserved = self
            .total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = current.checked_add(size)?;
                if self.cap != 0 && next > self.cap {
                    None
                } else {
                    Some(next)
                }
            })
            .is_ok();

        if reserved {
            self.allocated[tag.slot()].fetch_add(size, Ordering::Relaxed);
        }
        reserved
    }

    fn release(&self, size: usize, tag: MemType) {
        let size = size as u64;
        // A double release must never wrap the counters
        let _ = self.allocated[tag.slot()]
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(size))
            });
        let _ = self
            .total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_sub(size))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_release() {
        let mem = MemCap::unlimited();
        assert!(mem.reserve(100, MemType::Init));
        assert!(mem.reserve(20, MemType::Session));
        assert_eq!(mem.allocated(MemType::Init), 100);
        assert_eq!(mem.total(), 120);

        mem.release(100, MemType::Init);
        assert_eq!(mem.allocated(MemType::Init), 0);
        assert_eq!(mem.total(), 20);
    }

    #[test]
    fn test_cap_refuses() {
        let mem = MemCap::new(64);
        assert!(mem.reserve(60, MemType::Init));
        assert!(!mem.reserve(5, MemType::Init));
        assert_eq!(mem.total(), 60);
        assert!(mem.reserve(4, MemType::Memcap));
        assert_eq!(mem.total(), 64);
    }
}
