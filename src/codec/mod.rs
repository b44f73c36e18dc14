//! Pixel codec: instruction tokens ↔ carrier pixels
//!
//! This module provides the embedding scheme:
//! - [`pixel`]: [`Pixel`] and [`DeltaVector`] with wrapping arithmetic
//! - [`delta`]: the [`DeltaTable`] bijection
//! - [`encode`]: run-length stacking and pixel emission
//! - [`decode`]: pixel deltas back to tokens
//! - [`errors`]: [`CodecError`] and [`DeltaTableError`]
//!
//! # Stream Layout
//!
//! ```text
//! base  │ p0 = base + Δ(i0) │ p1 = p0 + Δ(i1) │ p2 = p1 (continuation) │ … │ EOF
//! ```
//!
//! The base pixel is the carrier pixel just before the origin, or
//! [`Pixel::SENTINEL`] when the origin is pixel 0. A zero delta repeats the
//! previous stackable instruction once more.

pub mod decode;
pub mod delta;
pub mod encode;
pub mod errors;
pub mod pixel;

pub use delta::DeltaTable;
pub use encode::{compress_runs, expand_runs, EncodedRun};
pub use errors::{CodecError, DeltaTableError};
pub use pixel::{DeltaVector, Pixel};

/// Encoder/decoder bound to one delta table.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'t> {
    table: &'t DeltaTable,
}

impl<'t> Codec<'t> {
    pub fn new(table: &'t DeltaTable) -> Self {
        Codec { table }
    }

    pub fn table(&self) -> &'t DeltaTable {
        self.table
    }
}
