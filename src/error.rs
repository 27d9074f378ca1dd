//! Startup errors
//!
//! Everything here is fatal: it means the event catalog, the configuration
//! or the memory budget is wrong, and the detector must not run with a
//! partially built registry. The alert path never returns these.

use thiserror::Error;

use crate::memory::MemType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("events are not in the right order: position {position} holds identity {identity}")]
    CatalogOrder { position: usize, identity: u32 },

    #[error("could not allocate {size} bytes for {tag}")]
    Alloc { size: usize, tag: MemType },

    #[error("event string truncated at position {position}: expected {expected} bytes, got {got}")]
    TemplateTruncated {
        position: usize,
        expected: usize,
        got: usize,
    },

    #[error("detector name too long: prefix is {len} bytes, max {max}")]
    DetectorNameTooLong { len: usize, max: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
