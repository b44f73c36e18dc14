//! Lexer for program source text
//!
//! Converts raw source text into a flat [`Token`] stream. Only the eight
//! instruction characters are significant; every other character (letters,
//! whitespace, punctuation) is treated as commentary and skipped, so lexing
//! never fails. The stream always ends with an
//! [`Instruction::EndOfProgram`] token located just past the last character.

use super::instruction::Instruction;
use std::fmt;

/// 1-based line/column of a token in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An instruction together with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub instruction: Instruction,
    pub location: SourceLocation,
}

/// Lexer for tape-language source
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some((ch, location)) = self.advance() {
            if let Some(instruction) = Instruction::from_symbol(ch) {
                tokens.push(Token {
                    instruction,
                    location,
                });
            }
        }

        tokens.push(Token {
            instruction: Instruction::EndOfProgram,
            location: self.current_location(),
        });

        tokens
    }

    /// Advance to next character, returning it with the location it was read at
    fn advance(&mut self) -> Option<(char, SourceLocation)> {
        let ch = *self.input.get(self.position)?;
        let location = self.current_location();
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some((ch, location))
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Lex `source` and keep only the instructions.
pub fn lex(source: &str) -> Vec<Instruction> {
    Lexer::new(source)
        .tokenize()
        .into_iter()
        .map(|token| token.instruction)
        .collect()
}
