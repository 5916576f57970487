//! Error types for the core decoder.
//!
//! Every fallible operation in this crate returns `Result<T, Error>`. Nothing
//! in library code panics on attacker-controlled image bytes; `assert!` and
//! `unwrap()` are reserved for invariants the crate itself establishes (e.g.
//! in tests that build synthetic images).

use thiserror::Error;

/// All error kinds the core decoder can produce.
///
/// `LfnChecksumMismatch` is deliberately absent here: a checksum
/// mismatch is non-fatal and is reported through `log::warn!` instead, with
/// the reader falling back to the 8.3 name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `read` request exceeded the bounds of the image.
    #[error("read of {length} bytes at offset {offset} exceeds the image (which holds {available} bytes)")]
    OutOfRange {
        offset: usize,
        length: usize,
        available: usize,
    },

    /// A fixed-width integer decode straddled the end of the image.
    #[error("{width}-byte decode at offset {offset} runs past the end of the image")]
    Truncated { offset: usize, width: usize },

    /// The BPB failed a sanity check (zero/non-power-of-two sector or
    /// cluster size, zero FAT count, inconsistent total-sector encoding).
    #[error("invalid BPB: {0}")]
    InvalidBpb(&'static str),

    /// A cluster number outside the addressable data region was queried.
    #[error("cluster {0} is reserved or out of range and cannot be dereferenced")]
    InvalidCluster(u32),

    /// A cluster chain did not reach end-of-chain within the bound on the
    /// total number of data clusters; almost always a damaged FAT cycle.
    #[error("cluster chain did not terminate within {0} clusters; the FAT is likely cyclic")]
    CorruptChain(usize),

    /// A path component had no matching directory entry.
    #[error("{0:?} not found")]
    NotFound(String),

    /// A path component resolved to an entry that is not a directory.
    #[error("{0:?} is not a directory")]
    NotADirectory(String),

    /// An entry passed to `open_file` is a directory or volume label.
    #[error("{0:?} is not a file")]
    NotAFile(String),

    /// A decoded date/time field lay outside its valid range.
    #[error("invalid timestamp field: {0}")]
    InvalidTimestamp(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
