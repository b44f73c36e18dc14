//! # Introduction
//!
//! brainpix hides programs for a tiny eight-instruction tape machine inside
//! the pixels of a PNG image, and later pulls them back out to run them or
//! step through them in a time-travel debugger.
//!
//! ## Pipeline
//!
//! ```text
//! inject:  Source → Lexer → Tokens → Codec::encode → Carrier pixels → PNG
//! run:     PNG → Carrier → Codec::decode → Tokens → Program → Engine → stdout
//! debug:   … → Program → History (snapshots) → TUI
//! ```
//!
//! 1. [`alphabet`]: the nine instructions and the source lexer.
//! 2. [`codec`]: the [`codec::DeltaTable`] bijection and the pixel
//!    encoder/decoder with run-length stacking.
//! 3. [`carrier`]: PNG files as row-major pixel grids.
//! 4. [`interpreter`]: bracket-matched [`interpreter::Program`]s and the
//!    tape [`interpreter::Engine`].
//! 5. [`snapshot`]: recorded execution history for stepping backward.
//! 6. [`ui`]: ratatui-based debugger TUI; not part of the stable library API.
//! 7. [`config`]: `brainpix.toml` settings.
//! 8. [`repl`]: the interactive prompt.
//!
//! ## Embedding scheme
//!
//! Each instruction run becomes one pixel whose colour differs from the
//! previous pixel by that instruction's delta vector. Repeats of `+ - < >`
//! are written as unchanged (zero-delta) pixels. The stream ends with an
//! end-of-program pixel.

pub mod alphabet;
pub mod carrier;
pub mod codec;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod repl;
pub mod snapshot;
pub mod ui;

pub use error::{Error, Result};

use alphabet::Lexer;
use carrier::Carrier;
use codec::{expand_runs, Codec, DeltaTable};
use interpreter::Program;

/// Lex and load program source.
///
/// Bracket errors come back as [`Error::Source`], carrying the line and
/// column the offending bracket was written at.
pub fn load_source(source: &str) -> Result<Program> {
    let tokens = Lexer::new(source).tokenize();
    let instructions: Vec<_> = tokens.iter().map(|token| token.instruction).collect();

    Program::load(&instructions).map_err(|error| match tokens.get(error.position()) {
        Some(token) => Error::Source {
            error,
            location: token.location,
        },
        None => Error::Load(error),
    })
}

/// Decode the program embedded in `carrier` at `origin` and load it.
pub fn load_embedded_program(
    table: &DeltaTable,
    carrier: &Carrier,
    origin: usize,
) -> Result<Program> {
    let runs = Codec::new(table).extract(carrier, origin)?;
    Ok(Program::load(&expand_runs(&runs))?)
}
