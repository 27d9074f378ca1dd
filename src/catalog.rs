//! Static event catalog
//!
//! Hand-authored: one entry per [`EventId`], in identity order. The registry
//! refuses to start if an entry's identity does not match its position, so
//! adding an event means adding the enum variant and the entry together.

use crate::types::{EventClass, EventId};

/// One hand-authored catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Alert class used for filtering
    pub class: EventClass,
    /// Expected identity; must equal the entry's position
    pub identity: u32,
    /// printf-style message template (`%s`, `%u`, `%x`, `%p`)
    pub template: &'static str,
}

impl CatalogEntry {
    pub const fn new(class: EventClass, id: EventId, template: &'static str) -> Self {
        Self {
            class,
            identity: id as u32,
            template,
        }
    }
}

use EventClass::{Cl, Co, Memcap, Sentinel, Smb};

/// The DCE/RPC2 event catalog
pub static CATALOG: [CatalogEntry; EventId::COUNT] = [
    CatalogEntry::new(
        Sentinel,
        EventId::NoEvent,
        "Have to use this because can't have an event sid of zero",
    ),
    CatalogEntry::new(Memcap, EventId::Memcap, "Memory cap exceeded"),
    CatalogEntry::new(
        Smb,
        EventId::SmbBadNbssType,
        "SMB - Bad NetBIOS Session Service session type",
    ),
    CatalogEntry::new(Smb, EventId::SmbBadType, "SMB - Bad SMB message type"),
    CatalogEntry::new(Smb, EventId::SmbBadId, "SMB - Bad SMB Id (not \\xffSMB)"),
    CatalogEntry::new(Smb, EventId::SmbBadWct, "SMB - %s: Bad word count: %u"),
    CatalogEntry::new(Smb, EventId::SmbBadBcc, "SMB - %s: Bad byte count: %u"),
    CatalogEntry::new(Smb, EventId::SmbBadFormat, "SMB - %s: Bad format type: %u"),
    CatalogEntry::new(
        Smb,
        EventId::SmbBadOff,
        "SMB - %s: Bad offset: %p not between %p and %p",
    ),
    CatalogEntry::new(Smb, EventId::SmbTdcntZero, "SMB - %s: Zero total data count"),
    CatalogEntry::new(
        Smb,
        EventId::SmbNbLtSmbhdr,
        "SMB - NetBIOS data length (%u) less than SMB header length (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbNbLtCom,
        "SMB - %s: Remaining NetBIOS data length (%u) less than command length (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbNbLtBcc,
        "SMB - %s: Remaining NetBIOS data length (%u) less than command byte count (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbNbLtDsize,
        "SMB - %s: Remaining NetBIOS data length (%u) less than command data size (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbTdcntLtDsize,
        "SMB - %s: Remaining total data count (%u) less than this command data size (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbDsentGtTdcnt,
        "SMB - %s: Total data sent (%u) greater than command total data expected (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbBccLtDsize,
        "SMB - %s: Byte count (%u) less than command data size (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbInvalidDsize,
        "SMB - %s: Invalid command data size (%u) for byte count (%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbExcessiveTreeConnects,
        "SMB - %s: Excessive Tree Connect requests (>%u) with pending Tree Connect responses",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbExcessiveReads,
        "SMB - %s: Excessive Read requests (>%u) with pending Read responses",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbExcessiveChaining,
        "SMB - Excessive command chaining (>%u)",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbMultChainSs,
        "SMB - Multiple chained login requests",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbMultChainTc,
        "SMB - Multiple chained tree connect requests",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbChainSsLogoff,
        "SMB - Chained login followed by logoff",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbChainTcTdis,
        "SMB - Chained tree connect followed by tree disconnect",
    ),
    CatalogEntry::new(
        Smb,
        EventId::SmbChainOpenClose,
        "SMB - Chained open pipe followed by close pipe",
    ),
    CatalogEntry::new(Smb, EventId::SmbInvalidShare, "SMB - Invalid share access: %s"),
    CatalogEntry::new(
        Co,
        EventId::CoBadMajVersion,
        "Connection-oriented DCE/RPC - Invalid major version: %u",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoBadMinVersion,
        "Connection-oriented DCE/RPC - Invalid minor version: %u",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoBadPduType,
        "Connection-oriented DCE/RPC - Invalid pdu type: 0x%02x",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFlenLtHdr,
        "Connection-oriented DCE/RPC - Fragment length (%u) less than header size (%u)",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFlenLtSize,
        "Connection-oriented DCE/RPC - %s: Remaining fragment length (%u) less than size needed (%u)",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoZeroCtxItems,
        "Connection-oriented DCE/RPC - %s: No context items specified",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoZeroTsyns,
        "Connection-oriented DCE/RPC - %s: No transfer syntaxes specified",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFragLtMaxXmitFrag,
        concat!(
            "Connection-oriented DCE/RPC - %s: Fragment length on non-last fragment (%u) less than ",
            "maximum negotiated fragment transmit size for client (%u)"
        ),
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFragGtMaxXmitFrag,
        concat!(
            "Connection-oriented DCE/RPC - %s: Fragment length (%u) greater than ",
            "maximum negotiated fragment transmit size (%u)"
        ),
    ),
    CatalogEntry::new(
        Co,
        EventId::CoAlterChangeByteOrder,
        "Connection-oriented DCE/RPC - Alter Context byte order different from Bind",
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFragDiffCallId,
        concat!(
            "Connection-oriented DCE/RPC - Call id (%u) of non first/last fragment different ",
            "from call id established for fragmented request (%u)"
        ),
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFragDiffOpnum,
        concat!(
            "Connection-oriented DCE/RPC - Opnum (%u) of non first/last fragment different ",
            "from opnum established for fragmented request (%u)"
        ),
    ),
    CatalogEntry::new(
        Co,
        EventId::CoFragDiffCtxId,
        concat!(
            "Connection-oriented DCE/RPC - Context id (%u) of non first/last fragment different ",
            "from context id established for fragmented request (%u)"
        ),
    ),
    CatalogEntry::new(
        Cl,
        EventId::ClBadMajVersion,
        "Connection-less DCE/RPC - Invalid major version: %u",
    ),
    CatalogEntry::new(
        Cl,
        EventId::ClBadPduType,
        "Connection-less DCE/RPC - Invalid pdu type: 0x%02x",
    ),
    CatalogEntry::new(
        Cl,
        EventId::ClDataLtHdr,
        "Connection-less DCE/RPC - Data length (%u) less than header size (%u)",
    ),
    CatalogEntry::new(
        Cl,
        EventId::ClBadSeqNum,
        "Connection-less DCE/RPC - %s: Bad sequence number",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        for (i, entry) in CATALOG.iter().enumerate() {
            assert_eq!(entry.identity as usize, i, "entry {} out of order", i);
        }
    }

    #[test]
    fn test_class_families() {
        for entry in CATALOG.iter() {
            let expected = match entry.identity {
                0 => Sentinel,
                1 => Memcap,
                2..=26 => Smb,
                27..=39 => Co,
                _ => Cl,
            };
            assert_eq!(entry.class, expected, "identity {}", entry.identity);
        }
    }

    #[test]
    fn test_long_templates_joined() {
        let entry = &CATALOG[EventId::CoFragLtMaxXmitFrag.index()];
        assert!(entry.template.contains("less than maximum negotiated"));
    }
}
