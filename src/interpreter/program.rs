//! Program loading and bracket matching
//!
//! [`Program::load`] turns a token stream into an executable program with a
//! precomputed jump table, so `[` and `]` resolve their partner in O(1)
//! during execution. Matching uses an explicit stack of open positions; no
//! recursion, so deeply nested programs cannot overflow the host stack.

use super::errors::{Bracket, LoadError};
use crate::alphabet::Instruction;
use tracing::debug;

/// A loaded, bracket-checked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    /// Partner index for every bracket, `None` elsewhere
    jumps: Vec<Option<usize>>,
}

impl Program {
    /// Load a token stream.
    ///
    /// The stream is cut after its first [`Instruction::EndOfProgram`]; if it
    /// has none, one is appended.
    pub fn load(tokens: &[Instruction]) -> Result<Program, LoadError> {
        let end = tokens
            .iter()
            .position(|&i| i == Instruction::EndOfProgram)
            .map_or(tokens.len(), |end| end + 1);
        let mut instructions = tokens[..end].to_vec();
        if instructions.last() != Some(&Instruction::EndOfProgram) {
            instructions.push(Instruction::EndOfProgram);
        }

        let mut jumps = vec![None; instructions.len()];
        let mut open: Vec<usize> = Vec::new();

        for (position, instruction) in instructions.iter().enumerate() {
            match instruction {
                Instruction::LoopOpen => open.push(position),
                Instruction::LoopClose => {
                    let start = open.pop().ok_or(LoadError::UnmatchedBracket {
                        position,
                        bracket: Bracket::Close,
                    })?;
                    jumps[start] = Some(position);
                    jumps[position] = Some(start);
                }
                _ => {}
            }
        }

        if let Some(&position) = open.last() {
            return Err(LoadError::UnmatchedBracket {
                position,
                bracket: Bracket::Open,
            });
        }

        debug!(
            instructions = instructions.len(),
            loops = jumps.iter().flatten().count() / 2,
            "loaded program"
        );

        Ok(Program {
            instructions,
            jumps,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions, end marker included
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Always false: a loaded program holds at least the end marker.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<Instruction> {
        self.instructions.get(ip).copied()
    }

    /// Index of the bracket matching the one at `ip`.
    pub fn jump_target(&self, ip: usize) -> Option<usize> {
        self.jumps.get(ip).copied().flatten()
    }
}
