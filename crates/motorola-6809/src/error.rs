//! Errors.

use std::fmt;

/// A snapshot that cannot be resumed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Micro-op queue cursor or length out of range.
    CorruptQueue,
    /// Opcode page other than 0, 2 or 3.
    InvalidPage(u8),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptQueue => write!(f, "snapshot micro-op queue is corrupt"),
            Self::InvalidPage(page) => write!(f, "snapshot opcode page {page} is not 0, 2 or 3"),
        }
    }
}

impl std::error::Error for SnapshotError {}
