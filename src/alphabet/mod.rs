//! Instruction alphabet and source lexing
//!
//! - [`instruction`]: the nine [`Instruction`] symbols and their properties
//! - [`lexer`]: source text → located [`Token`]s
//!
//! # Syntax
//!
//! | Char | Instruction  | Stackable |
//! |------|--------------|-----------|
//! | `>`  | MoveRight    | yes       |
//! | `<`  | MoveLeft     | yes       |
//! | `+`  | Increment    | yes       |
//! | `-`  | Decrement    | yes       |
//! | `.`  | Output       | no        |
//! | `,`  | Input        | no        |
//! | `[`  | LoopOpen     | no        |
//! | `]`  | LoopClose    | no        |
//!
//! Any other character is a comment.

pub mod instruction;
pub mod lexer;

pub use instruction::{to_source, Instruction};
pub use lexer::{lex, Lexer, SourceLocation, Token};
