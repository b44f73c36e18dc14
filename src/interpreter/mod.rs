//! Tape-machine execution
//!
//! This module provides the core execution logic:
//! - [`program`]: token stream → [`Program`] with a bracket jump table
//! - [`engine`]: the [`Engine`] that runs a program one instruction at a time
//! - [`tape`]: the growable byte [`Tape`]
//! - [`errors`]: load and runtime error types
//!
//! # Execution Model
//!
//! The engine keeps an explicit instruction pointer and never recurses into
//! loop bodies: `[` on a zero cell jumps past its matching `]`, and `]` on a
//! non-zero cell jumps back past its matching `[`. Input and output are plain
//! [`std::io::Read`] / [`std::io::Write`] handles supplied per call.

pub mod engine;
pub mod errors;
pub mod program;
pub mod tape;

pub use engine::{
    EofPolicy, Engine, EngineConfig, HaltReason, MachineState, RunSummary, StepOutcome,
    UnderflowPolicy,
};
pub use errors::{Bracket, LoadError, RuntimeError};
pub use program::Program;
pub use tape::Tape;
