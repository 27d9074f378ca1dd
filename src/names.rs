//! SMB command and DCE/RPC PDU type names
//!
//! Lookup tables used to put readable names into alert messages. Both
//! tables cover their whole code space; codes without a specific name map
//! to an "Unknown ..." placeholder.

use tracing::trace;

use crate::error::{Error, Result};
use crate::memory::{MemType, MemoryTracker};

/// Placeholder for SMB opcodes without a name
pub const UNKNOWN_SMB_COMMAND: &str = "Unknown SMB command";

/// Placeholder for PDU types without a name
pub const UNKNOWN_PDU_TYPE: &str = "Unknown DCE/RPC type";

/// Number of SMB1 command opcodes
pub const SMB_COMMAND_MAX: usize = 256;

/// SMB1 command opcodes that have a name
pub mod smb_com {
    pub const OPEN: u8 = 0x02;
    pub const CLOSE: u8 = 0x04;
    pub const RENAME: u8 = 0x07;
    pub const READ: u8 = 0x0A;
    pub const WRITE: u8 = 0x0B;
    pub const READ_BLOCK_RAW: u8 = 0x1A;
    pub const WRITE_BLOCK_RAW: u8 = 0x1D;
    pub const WRITE_COMPLETE: u8 = 0x20;
    pub const TRANSACTION: u8 = 0x25;
    pub const TRANSACTION_SECONDARY: u8 = 0x26;
    pub const WRITE_AND_CLOSE: u8 = 0x2C;
    pub const OPEN_ANDX: u8 = 0x2D;
    pub const READ_ANDX: u8 = 0x2E;
    pub const WRITE_ANDX: u8 = 0x2F;
    pub const TREE_CONNECT: u8 = 0x70;
    pub const TREE_DISCONNECT: u8 = 0x71;
    pub const NEGOTIATE: u8 = 0x72;
    pub const SESSION_SETUP_ANDX: u8 = 0x73;
    pub const LOGOFF_ANDX: u8 = 0x74;
    pub const TREE_CONNECT_ANDX: u8 = 0x75;
    pub const NT_CREATE_ANDX: u8 = 0xA2;
}

/// DCE/RPC PDU types, connection-oriented and connectionless
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    Request = 0,
    Ping = 1,
    Response = 2,
    Fault = 3,
    Working = 4,
    NoCall = 5,
    Reject = 6,
    Ack = 7,
    ClCancel = 8,
    Fack = 9,
    CancelAck = 10,
    Bind = 11,
    BindAck = 12,
    BindNack = 13,
    AlterContext = 14,
    AlterContextResp = 15,
    Auth3 = 16,
    Shutdown = 17,
    CoCancel = 18,
    Orphaned = 19,
    /// Microsoft Exchange/Outlook 2003 RPC over HTTP
    MsRpcOverHttp = 20,
}

/// Number of PDU type codes in the table
pub const PDU_TYPE_MAX: usize = 21;

impl TryFrom<u8> for PduType {
    type Error = ();

    fn try_from(v: u8) -> std::result::Result<Self, ()> {
        match v {
            0 => Ok(Self::Request),
            1 => Ok(Self::Ping),
            2 => Ok(Self::Response),
            3 => Ok(Self::Fault),
            4 => Ok(Self::Working),
            5 => Ok(Self::NoCall),
            6 => Ok(Self::Reject),
            7 => Ok(Self::Ack),
            8 => Ok(Self::ClCancel),
            9 => Ok(Self::Fack),
            10 => Ok(Self::CancelAck),
            11 => Ok(Self::Bind),
            12 => Ok(Self::BindAck),
            13 => Ok(Self::BindNack),
            14 => Ok(Self::AlterContext),
            15 => Ok(Self::AlterContextResp),
            16 => Ok(Self::Auth3),
            17 => Ok(Self::Shutdown),
            18 => Ok(Self::CoCancel),
            19 => Ok(Self::Orphaned),
            20 => Ok(Self::MsRpcOverHttp),
            _ => Err(()),
        }
    }
}

impl PduType {
    pub fn name(&self) -> &'static str {
        match self {
            PduType::Request => "Request",
            PduType::Ping => "Ping",
            PduType::Response => "Response",
            PduType::Fault => "Fault",
            PduType::Working => "Working",
            PduType::NoCall => "NoCall",
            PduType::Reject => "Reject",
            PduType::Ack => "Ack",
            PduType::ClCancel => "Cancel",
            PduType::Fack => "Fack",
            PduType::CancelAck => "Cancel Ack",
            PduType::Bind => "Bind",
            PduType::BindAck => "Bind Ack",
            PduType::BindNack => "Bind Nack",
            PduType::AlterContext => "Alter Context",
            PduType::AlterContextResp => "Alter Context Response",
            PduType::Auth3 => "Auth3",
            PduType::Shutdown => "Shutdown",
            PduType::CoCancel => "Cancel",
            PduType::Orphaned => "Orphaned",
            PduType::MsRpcOverHttp => "Microsoft Exchange/Outlook 2003",
        }
    }
}

fn smb_command_label(code: u8) -> &'static str {
    match code {
        smb_com::OPEN => "Open",
        smb_com::CLOSE => "Close",
        smb_com::RENAME => "Rename",
        smb_com::READ => "Read",
        smb_com::WRITE => "Write",
        smb_com::READ_BLOCK_RAW => "Read Block Raw",
        smb_com::WRITE_BLOCK_RAW => "Write Block Raw",
        smb_com::WRITE_COMPLETE => "Write Complete",
        smb_com::TRANSACTION => "Transaction",
        smb_com::TRANSACTION_SECONDARY => "Transaction Secondary",
        smb_com::WRITE_AND_CLOSE => "Write and Close",
        smb_com::OPEN_ANDX => "Open AndX",
        smb_com::READ_ANDX => "Read AndX",
        smb_com::WRITE_ANDX => "Write AndX",
        smb_com::TREE_CONNECT => "Tree Connect",
        smb_com::TREE_DISCONNECT => "Tree Disconnect",
        smb_com::NEGOTIATE => "Negotiate Protocol",
        smb_com::SESSION_SETUP_ANDX => "Session Setup AndX",
        smb_com::LOGOFF_ANDX => "Logoff AndX",
        smb_com::TREE_CONNECT_ANDX => "Tree Connect AndX",
        smb_com::NT_CREATE_ANDX => "Nt Create AndX",
        _ => UNKNOWN_SMB_COMMAND,
    }
}

/// Owned name tables, built once at startup
#[derive(Debug, Default)]
pub struct NameTables {
    smb_commands: Vec<String>,
    pdu_types: Vec<String>,
}

impl NameTables {
    /// Build both tables, reserving every name against `mem`
    pub fn new(mem: &dyn MemoryTracker) -> Result<Self> {
        let mut tables = Self::default();

        let smb = (0..SMB_COMMAND_MAX).map(|code| smb_command_label(code as u8));
        if let Err(e) = fill(&mut tables.smb_commands, smb, mem) {
            tables.teardown(mem);
            return Err(e);
        }

        let pdu = (0..PDU_TYPE_MAX).map(|code| {
            PduType::try_from(code as u8)
                .map(|t| t.name())
                .unwrap_or(UNKNOWN_PDU_TYPE)
        });
        if let Err(e) = fill(&mut tables.pdu_types, pdu, mem) {
            tables.teardown(mem);
            return Err(e);
        }

        Ok(tables)
    }

    /// Name of an SMB1 command opcode
    pub fn smb_command_name(&self, code: u8) -> &str {
        self.smb_commands
            .get(code as usize)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SMB_COMMAND)
    }

    /// Name of a DCE/RPC PDU type
    pub fn pdu_type_name(&self, code: u8) -> &str {
        self.pdu_types
            .get(code as usize)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PDU_TYPE)
    }

    /// Whether the tables currently hold their names
    pub fn is_built(&self) -> bool {
        !self.smb_commands.is_empty()
    }

    /// Release every name; repeated calls do nothing
    pub fn teardown(&mut self, mem: &dyn MemoryTracker) {
        for name in self.smb_commands.drain(..).chain(self.pdu_types.drain(..)) {
            mem.release(name.len() + 1, MemType::Init);
        }
    }
}

fn fill<'a>(
    table: &mut Vec<String>,
    names: impl Iterator<Item = &'a str>,
    mem: &dyn MemoryTracker,
) -> Result<()> {
    for name in names {
        let size = name.len() + 1;
        if !mem.reserve(size, MemType::Init) {
            return Err(Error::Alloc {
                size,
                tag: MemType::Init,
            });
        }
        trace!("name table entry {}: {}", table.len(), name);
        table.push(name.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemCap;

    #[test]
    fn test_smb_names_total() {
        let mem = MemCap::unlimited();
        let names = NameTables::new(&mem).unwrap();

        for code in 0..=255u8 {
            assert!(!names.smb_command_name(code).is_empty());
        }
        assert_eq!(names.smb_command_name(smb_com::READ_ANDX), "Read AndX");
        assert_eq!(names.smb_command_name(0x72), "Negotiate Protocol");
        assert_eq!(names.smb_command_name(0x00), UNKNOWN_SMB_COMMAND);
        assert_eq!(names.smb_command_name(0xFF), UNKNOWN_SMB_COMMAND);
    }

    #[test]
    fn test_pdu_names_total() {
        let mem = MemCap::unlimited();
        let names = NameTables::new(&mem).unwrap();

        for code in 0..=255u8 {
            assert!(!names.pdu_type_name(code).is_empty());
        }
        assert_eq!(names.pdu_type_name(PduType::Bind as u8), "Bind");
        assert_eq!(names.pdu_type_name(8), "Cancel");
        assert_eq!(names.pdu_type_name(18), "Cancel");
        assert_eq!(names.pdu_type_name(20), "Microsoft Exchange/Outlook 2003");
        assert_eq!(names.pdu_type_name(21), UNKNOWN_PDU_TYPE);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mem = MemCap::unlimited();
        let mut names = NameTables::new(&mem).unwrap();
        assert!(mem.allocated(MemType::Init) > 0);

        names.teardown(&mem);
        assert_eq!(mem.allocated(MemType::Init), 0);
        assert!(!names.is_built());
        assert_eq!(names.smb_command_name(smb_com::OPEN), UNKNOWN_SMB_COMMAND);

        names.teardown(&mem);
        assert_eq!(mem.total(), 0);
    }

    #[test]
    fn test_alloc_failure_is_reported() {
        let mem = MemCap::new(64);
        let err = NameTables::new(&mem).unwrap_err();
        assert!(matches!(err, Error::Alloc { tag: MemType::Init, .. }));
        // Partial tables are released on failure
        assert_eq!(mem.total(), 0);
    }
}
