//! Per-session alert deduplication state
//!
//! One bit per event identity. A session reports each kind of event at most
//! once: the first time an identity is raised its bit is set, and bits are
//! never cleared for the life of the session.

use crate::registry::EventRegistry;
use crate::types::EventId;

const WORD_BITS: usize = u64::BITS as usize;

/// Which event kinds a session has already used up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionAlertState {
    words: Vec<u64>,
    len: usize,
}

impl SessionAlertState {
    /// Create state for a catalog of `len` identities
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Create state sized for `registry`
    pub fn for_registry(registry: &EventRegistry) -> Self {
        Self::new(registry.len())
    }

    /// Number of identities this state can track
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Whether `id` has already been raised in this session
    ///
    /// Identities outside the sized range always read as set.
    pub fn is_set(&self, id: EventId) -> bool {
        let i = id.index();
        if i >= self.len {
            return true;
        }
        self.words[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0
    }

    /// Set the bit for `id`, returning whether it was already set
    pub fn test_and_set(&mut self, id: EventId) -> bool {
        let i = id.index();
        if i >= self.len {
            return true;
        }
        let word = &mut self.words[i / WORD_BITS];
        let mask = 1u64 << (i % WORD_BITS);
        let was_set = *word & mask != 0;
        *word |= mask;
        was_set
    }

    /// Number of identities already raised
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot() {
        let mut state = SessionAlertState::new(EventId::COUNT);
        assert!(!state.is_set(EventId::SmbBadWct));
        assert!(!state.test_and_set(EventId::SmbBadWct));
        assert!(state.is_set(EventId::SmbBadWct));
        assert!(state.test_and_set(EventId::SmbBadWct));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn test_high_identities_use_second_word() {
        let mut state = SessionAlertState::new(EventId::COUNT);
        assert_eq!(state.capacity(), 44);

        // Past any 32-bit mask
        assert!(!state.test_and_set(EventId::ClBadSeqNum));
        assert!(!state.test_and_set(EventId::CoFragDiffCtxId));
        assert!(!state.is_set(EventId::ClDataLtHdr));
        assert_eq!(state.count(), 2);

        let mut wide = SessionAlertState::new(130);
        assert_eq!(wide.words.len(), 3);
        assert!(!wide.test_and_set(EventId::NoEvent));
    }

    #[test]
    fn test_out_of_range_reads_as_set() {
        let mut state = SessionAlertState::new(4);
        assert!(state.is_set(EventId::SmbBadId));
        assert!(state.test_and_set(EventId::ClBadSeqNum));
        assert_eq!(state.count(), 0);
    }
}
