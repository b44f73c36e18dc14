//! The nine-symbol instruction alphabet
//!
//! Eight instructions appear in program source as single characters; the
//! ninth, [`Instruction::EndOfProgram`], has no source form and is appended
//! by the lexer so every token stream is explicitly terminated.

use serde::Deserialize;
use std::fmt;

/// One instruction of the tape language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    MoveRight,    // >
    MoveLeft,     // <
    Increment,    // +
    Decrement,    // -
    Output,       // .
    Input,        // ,
    LoopOpen,     // [
    LoopClose,    // ]
    EndOfProgram, // (no source form)
}

impl Instruction {
    /// Every instruction, in table order.
    pub const ALL: [Instruction; 9] = [
        Instruction::MoveRight,
        Instruction::MoveLeft,
        Instruction::Increment,
        Instruction::Decrement,
        Instruction::Output,
        Instruction::Input,
        Instruction::LoopOpen,
        Instruction::LoopClose,
        Instruction::EndOfProgram,
    ];

    /// Dense index used by lookup tables.
    pub fn index(self) -> usize {
        match self {
            Instruction::MoveRight => 0,
            Instruction::MoveLeft => 1,
            Instruction::Increment => 2,
            Instruction::Decrement => 3,
            Instruction::Output => 4,
            Instruction::Input => 5,
            Instruction::LoopOpen => 6,
            Instruction::LoopClose => 7,
            Instruction::EndOfProgram => 8,
        }
    }

    /// Whether consecutive repeats of this instruction may be collapsed
    /// into a single encoded run.
    pub fn is_stackable(self) -> bool {
        matches!(
            self,
            Instruction::MoveRight
                | Instruction::MoveLeft
                | Instruction::Increment
                | Instruction::Decrement
        )
    }

    /// The source character for this instruction, if it has one.
    pub fn symbol(self) -> Option<char> {
        match self {
            Instruction::MoveRight => Some('>'),
            Instruction::MoveLeft => Some('<'),
            Instruction::Increment => Some('+'),
            Instruction::Decrement => Some('-'),
            Instruction::Output => Some('.'),
            Instruction::Input => Some(','),
            Instruction::LoopOpen => Some('['),
            Instruction::LoopClose => Some(']'),
            Instruction::EndOfProgram => None,
        }
    }

    /// Parse a source character. Anything outside the alphabet is a comment.
    pub fn from_symbol(c: char) -> Option<Instruction> {
        match c {
            '>' => Some(Instruction::MoveRight),
            '<' => Some(Instruction::MoveLeft),
            '+' => Some(Instruction::Increment),
            '-' => Some(Instruction::Decrement),
            '.' => Some(Instruction::Output),
            ',' => Some(Instruction::Input),
            '[' => Some(Instruction::LoopOpen),
            ']' => Some(Instruction::LoopClose),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Instruction::MoveRight => "move right",
            Instruction::MoveLeft => "move left",
            Instruction::Increment => "increment",
            Instruction::Decrement => "decrement",
            Instruction::Output => "output",
            Instruction::Input => "input",
            Instruction::LoopOpen => "loop open",
            Instruction::LoopClose => "loop close",
            Instruction::EndOfProgram => "end of program",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(c) => write!(f, "{}", c),
            None => f.write_str("EOF"),
        }
    }
}

/// Render a token stream back into source text, one symbol per token.
///
/// The end marker has no source form and is skipped.
pub fn to_source(instructions: &[Instruction]) -> String {
    instructions.iter().filter_map(|i| i.symbol()).collect()
}
