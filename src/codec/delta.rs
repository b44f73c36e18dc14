//! Instruction ↔ delta-vector bijection
//!
//! A [`DeltaTable`] is built once (either [`DeltaTable::standard`] or a
//! validated custom table from the config file) and lent to every
//! [`Codec`](super::Codec) that needs it. Both directions are O(1): a dense
//! array indexed by [`Instruction::index`] and an `FxHashMap` keyed by the
//! vector.
//!
//! # Standard table
//!
//! Every channel magnitude lies in `10..=18` and alpha is never touched, so
//! an opaque carrier stays opaque.

use super::errors::{CodecError, DeltaTableError};
use super::pixel::DeltaVector;
use crate::alphabet::Instruction;
use rustc_hash::FxHashMap;

/// Standard vectors, in [`Instruction::ALL`] order.
const STANDARD: [(Instruction, [i8; 4]); 9] = [
    (Instruction::MoveRight, [12, -12, 12, 0]),
    (Instruction::MoveLeft, [-13, 13, -13, 0]),
    (Instruction::Increment, [10, 10, 10, 0]),
    (Instruction::Decrement, [-11, -11, -11, 0]),
    (Instruction::Output, [16, -16, -16, 0]),
    (Instruction::Input, [-17, 17, 17, 0]),
    (Instruction::LoopOpen, [14, 14, -14, 0]),
    (Instruction::LoopClose, [-15, -15, 15, 0]),
    (Instruction::EndOfProgram, [18, 18, 18, 0]),
];

/// Immutable bijection between instructions and delta vectors.
#[derive(Debug, Clone)]
pub struct DeltaTable {
    forward: [DeltaVector; 9],
    reverse: FxHashMap<DeltaVector, Instruction>,
}

impl DeltaTable {
    /// The built-in table.
    pub fn standard() -> Self {
        let entries = STANDARD.map(|(instruction, v)| (instruction, DeltaVector(v)));
        Self::build(&entries)
    }

    /// Build a table from explicit entries, checking that it is a bijection
    /// over all nine instructions and never uses the zero vector.
    pub fn new(entries: &[(Instruction, DeltaVector)]) -> Result<Self, DeltaTableError> {
        let mut seen: [Option<DeltaVector>; 9] = [None; 9];
        let mut owners: FxHashMap<DeltaVector, Instruction> = FxHashMap::default();

        for &(instruction, vector) in entries {
            if vector.is_zero() {
                return Err(DeltaTableError::ZeroVector(instruction));
            }
            if seen[instruction.index()].is_some() {
                return Err(DeltaTableError::DuplicateInstruction(instruction));
            }
            if let Some(&first) = owners.get(&vector) {
                return Err(DeltaTableError::DuplicateVector {
                    first,
                    second: instruction,
                    vector,
                });
            }
            seen[instruction.index()] = Some(vector);
            owners.insert(vector, instruction);
        }

        if let Some(missing) = Instruction::ALL
            .into_iter()
            .find(|i| seen[i.index()].is_none())
        {
            return Err(DeltaTableError::Missing(missing));
        }

        Ok(Self::build(entries))
    }

    fn build(entries: &[(Instruction, DeltaVector)]) -> Self {
        let mut forward = [DeltaVector::ZERO; 9];
        let mut reverse = FxHashMap::default();
        for &(instruction, vector) in entries {
            forward[instruction.index()] = vector;
            reverse.insert(vector, instruction);
        }
        DeltaTable { forward, reverse }
    }

    /// The delta vector that encodes `instruction`.
    pub fn vector_for(&self, instruction: Instruction) -> DeltaVector {
        self.forward[instruction.index()]
    }

    /// The instruction encoded by `vector`.
    pub fn instruction_for(&self, vector: DeltaVector) -> Result<Instruction, CodecError> {
        self.reverse
            .get(&vector)
            .copied()
            .ok_or(CodecError::UnknownDelta(vector))
    }

    /// Iterate over `(instruction, vector)` pairs in table order.
    pub fn entries(&self) -> impl Iterator<Item = (Instruction, DeltaVector)> + '_ {
        Instruction::ALL
            .into_iter()
            .map(move |instruction| (instruction, self.vector_for(instruction)))
    }
}

impl Default for DeltaTable {
    fn default() -> Self {
        Self::standard()
    }
}
