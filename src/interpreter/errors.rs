//! Load and runtime error types for the tape machine
//!
//! [`LoadError`] is raised while building a [`Program`](super::Program) from
//! a token stream; [`RuntimeError`] is raised while executing one.
//!
//! All runtime errors are fatal - they halt execution. The step limit is a
//! safety fuse rather than a program bug, see [`RuntimeError::is_fuse`].

use thiserror::Error;

/// Which side of a bracket pair is missing its partner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Open,
    Close,
}

impl Bracket {
    pub fn symbol(self) -> char {
        match self {
            Bracket::Open => '[',
            Bracket::Close => ']',
        }
    }
}

/// Malformed program structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A `[` without a `]` or a `]` without a `[`
    #[error("unmatched '{}' at instruction {position}", .bracket.symbol())]
    UnmatchedBracket { position: usize, bracket: Bracket },
}

impl LoadError {
    /// Instruction index of the offending bracket
    pub fn position(&self) -> usize {
        match self {
            LoadError::UnmatchedBracket { position, .. } => *position,
        }
    }
}

/// Runtime errors that can occur during execution
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Data pointer moved left of cell 0
    #[error("tape underflow: moved left of cell 0 at instruction {ip}")]
    TapeUnderflow { ip: usize },

    /// Data pointer moved past the configured tape length
    #[error("tape overflow: tape limit of {limit} cells exceeded at instruction {ip}")]
    TapeOverflow { ip: usize, limit: usize },

    /// Step budget used up
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },

    /// Reading input or writing output failed
    #[error("program I/O failed")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Whether this error is the step-limit fuse rather than a program fault.
    pub fn is_fuse(&self) -> bool {
        matches!(self, RuntimeError::StepLimitExceeded { .. })
    }

    /// Instruction index the error was raised at, if it is tied to one.
    pub fn instruction(&self) -> Option<usize> {
        match self {
            RuntimeError::TapeUnderflow { ip } => Some(*ip),
            RuntimeError::TapeOverflow { ip, .. } => Some(*ip),
            RuntimeError::StepLimitExceeded { .. } | RuntimeError::Io(_) => None,
        }
    }
}
