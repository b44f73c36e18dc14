//! Error types for the pixel codec
//!
//! [`CodecError`] covers everything that can go wrong while writing a token
//! stream into a carrier or reading one back out. [`DeltaTableError`] is
//! raised only when a custom delta table is constructed.

use super::pixel::DeltaVector;
use crate::alphabet::Instruction;
use thiserror::Error;

/// Encode/decode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The carrier has fewer pixels after the origin than the stream needs
    #[error("carrier too small: program needs {required} pixels, {available} available")]
    InsufficientCapacity { required: usize, available: usize },

    /// A pixel delta that no instruction maps to (or a misplaced continuation)
    #[error("corrupt pixel stream at pixel {index}: delta {delta} is not an instruction")]
    CorruptStream { index: usize, delta: DeltaVector },

    /// Lookup miss in the delta table
    #[error("no instruction is encoded by delta {0}")]
    UnknownDelta(DeltaVector),

    /// Ran out of pixels before reading an end-of-program marker
    #[error("pixel stream ended after {pixels} pixels without an end-of-program marker")]
    UnterminatedStream { pixels: usize },

    /// Token sequence handed to the encoder is not terminated
    #[error("token sequence must end with an end-of-program marker")]
    MissingEndOfProgram,

    /// Embedding origin lies outside the carrier
    #[error("origin {origin} is outside a carrier of {len} pixels")]
    OriginOutOfBounds { origin: usize, len: usize },
}

/// Invalid custom delta table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaTableError {
    #[error("no delta vector given for '{}'", .0.name())]
    Missing(Instruction),

    #[error("'{}' is assigned twice", .0.name())]
    DuplicateInstruction(Instruction),

    #[error("'{}' and '{}' share delta vector {vector}", .first.name(), .second.name())]
    DuplicateVector {
        first: Instruction,
        second: Instruction,
        vector: DeltaVector,
    },

    #[error("'{}' uses the zero vector, which is reserved for continuations", .0.name())]
    ZeroVector(Instruction),
}
