//! Event identities, class tags and alert constants
//!
//! The numeric value of every [`EventId`] is both its position in the
//! event catalog and the sub-identifier reported with the alert, so the
//! discriminants below must stay dense and in catalog order.

use serde::{Deserialize, Serialize};

/// Generator id reported with every alert from this detector
pub const GENERATOR_DCE2: u32 = 133;

/// Default detector name used in the rendered message prefix
pub const DETECTOR_NAME: &str = "dcerpc2";

/// Priority reported with every alert
pub const ALERT_PRIORITY: u32 = 3;

/// Signature revision reported with every alert
pub const ALERT_REVISION: u32 = 1;

/// Classification reported with every alert
pub const ALERT_CLASSIFICATION: u32 = 0;

/// Maximum length in bytes of a rendered alert message
pub const MAX_MESSAGE_LEN: usize = 255;

/// Maximum length in bytes of the `"(name) "` prefix
pub const DETECTOR_PREFIX_MAX: usize = 99;

/// Alert class used for coarse enable/disable filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventClass {
    /// Reserved for the "no event" catalog entry, never enabled
    Sentinel,
    /// Memory cap exceeded
    Memcap,
    /// SMB framing and command anomalies
    Smb,
    /// Connection-oriented DCE/RPC
    Co,
    /// Connectionless DCE/RPC
    Cl,
}

impl EventClass {
    /// Classes that can be enabled through configuration
    pub const CONFIGURABLE: [EventClass; 4] =
        [EventClass::Memcap, EventClass::Smb, EventClass::Co, EventClass::Cl];

    /// Configuration keyword for this class
    pub fn as_str(&self) -> &'static str {
        match self {
            EventClass::Sentinel => "none",
            EventClass::Memcap => "memcap",
            EventClass::Smb => "smb",
            EventClass::Co => "co",
            EventClass::Cl => "cl",
        }
    }

    /// Parse a configuration keyword
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memcap" => Some(EventClass::Memcap),
            "smb" => Some(EventClass::Smb),
            "co" => Some(EventClass::Co),
            "cl" => Some(EventClass::Cl),
            _ => None,
        }
    }

    pub(crate) fn bit(&self) -> u8 {
        match self {
            EventClass::Sentinel => 0,
            EventClass::Memcap => 1 << 0,
            EventClass::Smb => 1 << 1,
            EventClass::Co => 1 << 2,
            EventClass::Cl => 1 << 3,
        }
    }
}

impl std::fmt::Display for EventClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one kind of detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum EventId {
    NoEvent = 0,
    Memcap = 1,
    SmbBadNbssType = 2,
    SmbBadType = 3,
    SmbBadId = 4,
    SmbBadWct = 5,
    SmbBadBcc = 6,
    SmbBadFormat = 7,
    SmbBadOff = 8,
    SmbTdcntZero = 9,
    SmbNbLtSmbhdr = 10,
    SmbNbLtCom = 11,
    SmbNbLtBcc = 12,
    SmbNbLtDsize = 13,
    SmbTdcntLtDsize = 14,
    SmbDsentGtTdcnt = 15,
    SmbBccLtDsize = 16,
    SmbInvalidDsize = 17,
    SmbExcessiveTreeConnects = 18,
    SmbExcessiveReads = 19,
    SmbExcessiveChaining = 20,
    SmbMultChainSs = 21,
    SmbMultChainTc = 22,
    SmbChainSsLogoff = 23,
    SmbChainTcTdis = 24,
    SmbChainOpenClose = 25,
    SmbInvalidShare = 26,
    CoBadMajVersion = 27,
    CoBadMinVersion = 28,
    CoBadPduType = 29,
    CoFlenLtHdr = 30,
    CoFlenLtSize = 31,
    CoZeroCtxItems = 32,
    CoZeroTsyns = 33,
    CoFragLtMaxXmitFrag = 34,
    CoFragGtMaxXmitFrag = 35,
    CoAlterChangeByteOrder = 36,
    CoFragDiffCallId = 37,
    CoFragDiffOpnum = 38,
    CoFragDiffCtxId = 39,
    ClBadMajVersion = 40,
    ClBadPduType = 41,
    ClDataLtHdr = 42,
    ClBadSeqNum = 43,
}

impl EventId {
    /// Number of event identities, including the "no event" sentinel
    pub const COUNT: usize = 44;

    /// Every identity in catalog order
    pub const ALL: [EventId; EventId::COUNT] = [
        EventId::NoEvent,
        EventId::Memcap,
        EventId::SmbBadNbssType,
        EventId::SmbBadType,
        EventId::SmbBadId,
        EventId::SmbBadWct,
        EventId::SmbBadBcc,
        EventId::SmbBadFormat,
        EventId::SmbBadOff,
        EventId::SmbTdcntZero,
        EventId::SmbNbLtSmbhdr,
        EventId::SmbNbLtCom,
        EventId::SmbNbLtBcc,
        EventId::SmbNbLtDsize,
        EventId::SmbTdcntLtDsize,
        EventId::SmbDsentGtTdcnt,
        EventId::SmbBccLtDsize,
        EventId::SmbInvalidDsize,
        EventId::SmbExcessiveTreeConnects,
        EventId::SmbExcessiveReads,
        EventId::SmbExcessiveChaining,
        EventId::SmbMultChainSs,
        EventId::SmbMultChainTc,
        EventId::SmbChainSsLogoff,
        EventId::SmbChainTcTdis,
        EventId::SmbChainOpenClose,
        EventId::SmbInvalidShare,
        EventId::CoBadMajVersion,
        EventId::CoBadMinVersion,
        EventId::CoBadPduType,
        EventId::CoFlenLtHdr,
        EventId::CoFlenLtSize,
        EventId::CoZeroCtxItems,
        EventId::CoZeroTsyns,
        EventId::CoFragLtMaxXmitFrag,
        EventId::CoFragGtMaxXmitFrag,
        EventId::CoAlterChangeByteOrder,
        EventId::CoFragDiffCallId,
        EventId::CoFragDiffOpnum,
        EventId::CoFragDiffCtxId,
        EventId::ClBadMajVersion,
        EventId::ClBadPduType,
        EventId::ClDataLtHdr,
        EventId::ClBadSeqNum,
    ];

    /// Look up an identity by its numeric value
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Catalog position (and alert sub-identifier) of this identity
    pub fn index(&self) -> usize {
        *self as u32 as usize
    }

    /// Numeric value reported to the alert sink
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", GENERATOR_DCE2, self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_dense() {
        for (i, id) in EventId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
        assert_eq!(EventId::ALL.len(), EventId::COUNT);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(EventId::from_index(0), Some(EventId::NoEvent));
        assert_eq!(EventId::from_index(43), Some(EventId::ClBadSeqNum));
        assert_eq!(EventId::from_index(44), None);
    }

    #[test]
    fn test_class_keywords() {
        for class in EventClass::CONFIGURABLE {
            assert_eq!(EventClass::from_keyword(class.as_str()), Some(class));
        }
        assert_eq!(EventClass::from_keyword(" SMB "), Some(EventClass::Smb));
        assert_eq!(EventClass::from_keyword("none"), None);
        assert_eq!(EventClass::Sentinel.bit(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(EventId::SmbBadWct.to_string(), "133:5");
        assert_eq!(EventClass::Co.to_string(), "co");
    }
}
