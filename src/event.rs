//! Typed events raised by the SMB and DCE/RPC parsers
//!
//! Each variant carries exactly the values its catalog template prints, in
//! template order, so a parser cannot raise an event with the wrong
//! arguments. Command and PDU type codes are printed by name.

use smallvec::{smallvec, SmallVec};

use crate::format::EventArg;
use crate::names::NameTables;
use crate::types::EventId;

pub type EventArgs<'a> = SmallVec<[EventArg<'a>; 4]>;

/// An anomaly observed by a protocol parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dce2Event<'a> {
    Memcap,

    // SMB framing
    SmbBadNbssType,
    SmbBadType,
    SmbBadId,
    SmbBadWct { command: u8, word_count: u32 },
    SmbBadBcc { command: u8, byte_count: u32 },
    SmbBadFormat { command: u8, format: u32 },
    SmbBadOffset { command: u8, offset: usize, start: usize, end: usize },
    SmbTdcntZero { command: u8 },
    SmbNbLtSmbhdr { nb_len: u32, header_len: u32 },
    SmbNbLtCom { command: u8, remaining: u32, command_len: u32 },
    SmbNbLtBcc { command: u8, remaining: u32, byte_count: u32 },
    SmbNbLtDsize { command: u8, remaining: u32, data_size: u32 },
    SmbTdcntLtDsize { command: u8, total_remaining: u32, data_size: u32 },
    SmbDsentGtTdcnt { command: u8, sent: u32, expected: u32 },
    SmbBccLtDsize { command: u8, byte_count: u32, data_size: u32 },
    SmbInvalidDsize { command: u8, data_size: u32, byte_count: u32 },
    SmbExcessiveTreeConnects { command: u8, max: u32 },
    SmbExcessiveReads { command: u8, max: u32 },
    SmbExcessiveChaining { max: u32 },
    SmbMultChainSs,
    SmbMultChainTc,
    SmbChainSsLogoff,
    SmbChainTcTdis,
    SmbChainOpenClose,
    SmbInvalidShare { share: &'a str },

    // Connection-oriented DCE/RPC
    CoBadMajVersion { version: u32 },
    CoBadMinVersion { version: u32 },
    CoBadPduType { pdu_type: u8 },
    CoFlenLtHdr { frag_len: u32, header_len: u32 },
    CoFlenLtSize { pdu_type: u8, remaining: u32, needed: u32 },
    CoZeroCtxItems { pdu_type: u8 },
    CoZeroTsyns { pdu_type: u8 },
    CoFragLtMaxXmitFrag { pdu_type: u8, frag_len: u32, max_xmit_frag: u32 },
    CoFragGtMaxXmitFrag { pdu_type: u8, frag_len: u32, max_xmit_frag: u32 },
    CoAlterChangeByteOrder,
    CoFragDiffCallId { call_id: u32, expected: u32 },
    CoFragDiffOpnum { opnum: u32, expected: u32 },
    CoFragDiffCtxId { ctx_id: u32, expected: u32 },

    // Connectionless DCE/RPC
    ClBadMajVersion { version: u32 },
    ClBadPduType { pdu_type: u8 },
    ClDataLtHdr { data_len: u32, header_len: u32 },
    ClBadSeqNum { pdu_type: u8 },
}

impl<'a> Dce2Event<'a> {
    pub fn id(&self) -> EventId {
        match self {
            Self::Memcap => EventId::Memcap,
            Self::SmbBadNbssType => EventId::SmbBadNbssType,
            Self::SmbBadType => EventId::SmbBadType,
            Self::SmbBadId => EventId::SmbBadId,
            Self::SmbBadWct { .. } => EventId::SmbBadWct,
            Self::SmbBadBcc { .. } => EventId::SmbBadBcc,
            Self::SmbBadFormat { .. } => EventId::SmbBadFormat,
            Self::SmbBadOffset { .. } => EventId::SmbBadOff,
            Self::SmbTdcntZero { .. } => EventId::SmbTdcntZero,
            Self::SmbNbLtSmbhdr { .. } => EventId::SmbNbLtSmbhdr,
            Self::SmbNbLtCom { .. } => EventId::SmbNbLtCom,
            Self::SmbNbLtBcc { .. } => EventId::SmbNbLtBcc,
            Self::SmbNbLtDsize { .. } => EventId::SmbNbLtDsize,
            Self::SmbTdcntLtDsize { .. } => EventId::SmbTdcntLtDsize,
            Self::SmbDsentGtTdcnt { .. } => EventId::SmbDsentGtTdcnt,
            Self::SmbBccLtDsize { .. } => EventId::SmbBccLtDsize,
            Self::SmbInvalidDsize { .. } => EventId::SmbInvalidDsize,
            Self::SmbExcessiveTreeConnects { .. } => EventId::SmbExcessiveTreeConnects,
            Self::SmbExcessiveReads { .. } => EventId::SmbExcessiveReads,
            Self::SmbExcessiveChaining { .. } => EventId::SmbExcessiveChaining,
            Self::SmbMultChainSs => EventId::SmbMultChainSs,
            Self::SmbMultChainTc => EventId::SmbMultChainTc,
            Self::SmbChainSsLogoff => EventId::SmbChainSsLogoff,
            Self::SmbChainTcTdis => EventId::SmbChainTcTdis,
            Self::SmbChainOpenClose => EventId::SmbChainOpenClose,
            Self::SmbInvalidShare { .. } => EventId::SmbInvalidShare,
            Self::CoBadMajVersion { .. } => EventId::CoBadMajVersion,
            Self::CoBadMinVersion { .. } => EventId::CoBadMinVersion,
            Self::CoBadPduType { .. } => EventId::CoBadPduType,
            Self::CoFlenLtHdr { .. } => EventId::CoFlenLtHdr,
            Self::CoFlenLtSize { .. } => EventId::CoFlenLtSize,
            Self::CoZeroCtxItems { .. } => EventId::CoZeroCtxItems,
            Self::CoZeroTsyns { .. } => EventId::CoZeroTsyns,
            Self::CoFragLtMaxXmitFrag { .. } => EventId::CoFragLtMaxXmitFrag,
            Self::CoFragGtMaxXmitFrag { .. } => EventId::CoFragGtMaxXmitFrag,
            Self::CoAlterChangeByteOrder => EventId::CoAlterChangeByteOrder,
            Self::CoFragDiffCallId { .. } => EventId::CoFragDiffCallId,
            Self::CoFragDiffOpnum { .. } => EventId::CoFragDiffOpnum,
            Self::CoFragDiffCtxId { .. } => EventId::CoFragDiffCtxId,
            Self::ClBadMajVersion { .. } => EventId::ClBadMajVersion,
            Self::ClBadPduType { .. } => EventId::ClBadPduType,
            Self::ClDataLtHdr { .. } => EventId::ClDataLtHdr,
            Self::ClBadSeqNum { .. } => EventId::ClBadSeqNum,
        }
    }

    /// Template arguments, in placeholder order
    pub fn args<'s>(&'s self, names: &'s NameTables) -> EventArgs<'s> {
        let com = move |c: &u8| EventArg::from(names.smb_command_name(*c));
        let pdu = move |t: &u8| EventArg::from(names.pdu_type_name(*t));
        let num = |v: &u32| EventArg::Unsigned(*v as u64);

        match self {
            Self::Memcap
            | Self::SmbBadNbssType
            | Self::SmbBadType
            | Self::SmbBadId
            | Self::SmbMultChainSs
            | Self::SmbMultChainTc
            | Self::SmbChainSsLogoff
            | Self::SmbChainTcTdis
            | Self::SmbChainOpenClose
            | Self::CoAlterChangeByteOrder => SmallVec::new(),

            Self::SmbBadWct { command, word_count: v }
            | Self::SmbBadBcc { command, byte_count: v }
            | Self::SmbBadFormat { command, format: v }
            | Self::SmbExcessiveTreeConnects { command, max: v }
            | Self::SmbExcessiveReads { command, max: v } => smallvec![com(command), num(v)],

            Self::SmbBadOffset { command, offset, start, end } => smallvec![
                com(command),
                EventArg::Pointer(*offset),
                EventArg::Pointer(*start),
                EventArg::Pointer(*end),
            ],

            Self::SmbTdcntZero { command } => smallvec![com(command)],

            Self::SmbNbLtSmbhdr { nb_len: a, header_len: b }
            | Self::CoFlenLtHdr { frag_len: a, header_len: b }
            | Self::CoFragDiffCallId { call_id: a, expected: b }
            | Self::CoFragDiffOpnum { opnum: a, expected: b }
            | Self::CoFragDiffCtxId { ctx_id: a, expected: b }
            | Self::ClDataLtHdr { data_len: a, header_len: b } => smallvec![num(a), num(b)],

            Self::SmbNbLtCom { command, remaining: a, command_len: b }
            | Self::SmbNbLtBcc { command, remaining: a, byte_count: b }
            | Self::SmbNbLtDsize { command, remaining: a, data_size: b }
            | Self::SmbTdcntLtDsize { command, total_remaining: a, data_size: b }
            | Self::SmbDsentGtTdcnt { command, sent: a, expected: b }
            | Self::SmbBccLtDsize { command, byte_count: a, data_size: b }
            | Self::SmbInvalidDsize { command, data_size: a, byte_count: b } => {
                smallvec![com(command), num(a), num(b)]
            }

            Self::SmbExcessiveChaining { max: v }
            | Self::CoBadMajVersion { version: v }
            | Self::CoBadMinVersion { version: v }
            | Self::ClBadMajVersion { version: v } => smallvec![num(v)],

            Self::SmbInvalidShare { share } => smallvec![EventArg::from(*share)],

            Self::CoBadPduType { pdu_type } | Self::ClBadPduType { pdu_type } => {
                smallvec![EventArg::Unsigned(*pdu_type as u64)]
            }

            Self::CoFlenLtSize { pdu_type, remaining: a, needed: b }
            | Self::CoFragLtMaxXmitFrag { pdu_type, frag_len: a, max_xmit_frag: b }
            | Self::CoFragGtMaxXmitFrag { pdu_type, frag_len: a, max_xmit_frag: b } => {
                smallvec![pdu(pdu_type), num(a), num(b)]
            }

            Self::CoZeroCtxItems { pdu_type }
            | Self::CoZeroTsyns { pdu_type }
            | Self::ClBadSeqNum { pdu_type } => smallvec![pdu(pdu_type)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use crate::format::{render, MessageBuffer};
    use crate::memory::MemCap;
    use crate::names::{smb_com, PduType};

    fn render_event(event: &Dce2Event<'_>, names: &NameTables) -> String {
        let mut out = MessageBuffer::new();
        render(CATALOG[event.id().index()].template, &event.args(names), &mut out);
        out.as_str().to_string()
    }

    #[test]
    fn test_smb_command_by_name() {
        let names = NameTables::new(&MemCap::unlimited()).unwrap();
        let event = Dce2Event::SmbBadWct {
            command: smb_com::WRITE_ANDX,
            word_count: 3,
        };
        assert_eq!(event.id(), EventId::SmbBadWct);
        assert_eq!(render_event(&event, &names), "SMB - Write AndX: Bad word count: 3");
    }

    #[test]
    fn test_pdu_type_by_name_and_number() {
        let names = NameTables::new(&MemCap::unlimited()).unwrap();

        let event = Dce2Event::CoZeroCtxItems {
            pdu_type: PduType::Bind as u8,
        };
        assert_eq!(
            render_event(&event, &names),
            "Connection-oriented DCE/RPC - Bind: No context items specified"
        );

        let event = Dce2Event::ClBadPduType { pdu_type: 0x1f };
        assert_eq!(
            render_event(&event, &names),
            "Connection-less DCE/RPC - Invalid pdu type: 0x1f"
        );
    }

    #[test]
    fn test_bad_offset_pointers() {
        let names = NameTables::new(&MemCap::unlimited()).unwrap();
        let event = Dce2Event::SmbBadOffset {
            command: smb_com::READ_ANDX,
            offset: 0x200,
            start: 0x100,
            end: 0x180,
        };
        assert_eq!(
            render_event(&event, &names),
            "SMB - Read AndX: Bad offset: 0x200 not between 0x100 and 0x180"
        );
    }

    #[test]
    fn test_no_placeholders_left() {
        let names = NameTables::new(&MemCap::unlimited()).unwrap();
        let events = [
            Dce2Event::Memcap,
            Dce2Event::SmbNbLtCom { command: 0x25, remaining: 10, command_len: 32 },
            Dce2Event::SmbInvalidShare { share: "\\\\HOST\\C$" },
            Dce2Event::CoFragGtMaxXmitFrag { pdu_type: 0, frag_len: 5840, max_xmit_frag: 4280 },
            Dce2Event::CoFragDiffOpnum { opnum: 9, expected: 4 },
            Dce2Event::ClBadSeqNum { pdu_type: 0 },
        ];
        for event in &events {
            let s = render_event(event, &names);
            assert!(!s.contains('%'), "{:?} rendered as {}", event, s);
        }
    }
}
