//! Error types shared by the KB, propagator and wire-protocol glue.
//!
//! Mirrors the teacher's `server::connection::Error`/`ErrorCode` split: a
//! small enum of fatal kinds, each carrying the detail that caused it,
//! with no `thiserror`/`anyhow` dependency. Variants match spec.md §7
//! exactly: a malformed message and an unknown token are both wire-level
//! protocol violations; timeouts are enforced outside this crate
//! (transport layer); KB inconsistency carries a different diagnostic
//! (which player/card/rule, not which wire byte).
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A line from the wire couldn't be parsed as any known command, or a
    /// known command's arguments didn't match its shape, or a command
    /// whose precondition the referee is supposed to guarantee (e.g.
    /// `disprove` naming a player who holds none of the triple) turned
    /// out false.
    Malformed { line: String },
    /// A line parsed as a command head but the head itself isn't one of
    /// the wire protocol's known commands.
    UnknownCommand { token: String },
    /// A KB primitive's precondition failed, or a selection group reduced
    /// to empty under R3. Always fatal: subsequent deductions would be
    /// unsound.
    Inconsistent { detail: String },
}

/// Whether a [`ProtocolError`] originates from the wire (bad input) or
/// the belief state itself (bad deduction) — the two buckets spec.md §7
/// calls out as distinct fatal kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    ProtocolViolation,
    Inconsistent,
}

impl ProtocolError {
    pub fn malformed(line: impl Into<String>) -> Self {
        ProtocolError::Malformed { line: line.into() }
    }

    pub fn unknown_command(token: &str) -> Self {
        ProtocolError::UnknownCommand {
            token: token.to_string(),
        }
    }

    pub fn inconsistent(detail: impl Into<String>) -> Self {
        ProtocolError::Inconsistent {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::Malformed { .. } | ProtocolError::UnknownCommand { .. } => {
                ErrorKind::ProtocolViolation
            }
            ProtocolError::Inconsistent { .. } => ErrorKind::Inconsistent,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed { line } => write!(f, "malformed message: {line}"),
            ProtocolError::UnknownCommand { token } => write!(f, "unknown command: {token}"),
            ProtocolError::Inconsistent { detail } => write!(f, "inconsistent: {detail}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

pub type Result<T> = std::result::Result<T, ProtocolError>;
