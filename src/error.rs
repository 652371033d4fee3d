use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a load, an interpretation or an emission.
///
/// Structural variants carry the byte offset of the offending bracket in the
/// program source.
#[derive(Debug, Error)]
pub enum Error {
    #[error("can't open read file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("program is {len} bytes, larger than the {max} byte limit")]
    ProgramTooLarge { len: usize, max: usize },
    #[error("can't allocate a tape of {cells} cells")]
    TapeAllocation { cells: usize },
    #[error("can't open output file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("max nesting level {capacity} reached at byte {position}")]
    NestingOverflow { position: usize, capacity: usize },
    #[error("unbalanced brackets: `]` at byte {position} has no matching `[`")]
    UnbalancedClose { position: usize },
    #[error("unbalanced brackets: `[` at byte {position} is never closed")]
    UnbalancedOpen { position: usize },
    #[error("pointer moved off the tape to {pointer} at byte {position}")]
    PointerOutOfBounds { position: usize, pointer: isize },
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this error. Codes 1 and 2 are left for the
    /// command line's own usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Read { .. } => 3,
            Error::ProgramTooLarge { .. } => 4,
            Error::TapeAllocation { .. } => 5,
            Error::Write { .. } => 6,
            Error::NestingOverflow { .. } => 7,
            Error::UnbalancedClose { .. } => 8,
            Error::UnbalancedOpen { .. } => 9,
            Error::InvalidConfig(_) => 10,
            Error::PointerOutOfBounds { .. } => 11,
            Error::StepLimitExceeded { .. } => 12,
            Error::Io(_) => 13,
        }
    }
}
