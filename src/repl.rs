//! Interactive prompt
//!
//! Each line read is loaded and run on a fresh machine. `,` reads from the
//! same reader as the prompt, so input typed after a line feeds the program.
//! Errors are printed and the loop carries on until the reader is exhausted.

use crate::interpreter::{Engine, EngineConfig};
use std::error::Error as StdError;
use std::io::{self, BufRead, Write};
use tracing::debug;

const PROMPT: &str = "> ";

/// Prompt options
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplOptions {
    pub engine: EngineConfig,
    /// Print the final machine state after every line
    pub dump_state: bool,
}

/// Run the prompt until `reader` reaches end of input.
///
/// Returns the number of lines that ran to completion.
pub fn run_prompt<R: BufRead, W: Write>(
    reader: &mut R,
    output: &mut W,
    options: ReplOptions,
) -> io::Result<usize> {
    let mut completed = 0;

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(completed);
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        let program = match crate::load_source(line) {
            Ok(program) => program,
            Err(e) => {
                writeln!(output, "error: {}", report(&e))?;
                continue;
            }
        };

        let mut engine = Engine::new(&program, options.engine);
        let result = engine.run(&mut *reader, &mut *output);
        if engine.state().output_bytes > 0 {
            writeln!(output)?;
        }
        match result {
            Ok(summary) => {
                debug!(steps = summary.steps, "prompt line finished");
                completed += 1;
            }
            Err(e) => writeln!(output, "error: {}", report(&e))?,
        }
        if options.dump_state {
            write!(output, "{}", engine.state())?;
        }
    }
}

/// An error and its causes on one line
fn report(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        message.push_str(": ");
        message.push_str(&e.to_string());
        cause = e.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::UnderflowPolicy;
    use std::io::Cursor;

    fn session(input: &str, options: ReplOptions) -> (usize, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let completed = run_prompt(&mut reader, &mut output, options).unwrap();
        (completed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_each_line_runs_on_a_fresh_tape() {
        let (completed, output) = session(
            "++++++++[>++++++++<-]>+.\n+++++++++++++++++++++++++++++++++.\n",
            ReplOptions::default(),
        );
        assert_eq!(completed, 2);
        assert_eq!(output, "> A\n> !\n> \n");
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let (completed, output) = session("+]\n<\n\n+.\n", ReplOptions::default());

        assert_eq!(completed, 1);
        assert!(output.contains("error: unmatched ']' at instruction 1 (line 1, column 2)"));
        assert!(output.contains("error: tape underflow"));
        assert!(output.ends_with("> \u{1}\n> \n"));
    }

    #[test]
    fn test_input_comes_from_the_following_text() {
        let (completed, output) = session(",.\nz\n", ReplOptions::default());
        assert_eq!(completed, 1);
        assert!(output.starts_with("> z\n"));
    }

    #[test]
    fn test_dump_state_after_each_line() {
        let options = ReplOptions {
            engine: EngineConfig {
                underflow: UnderflowPolicy::Clamp,
                ..EngineConfig::default()
            },
            dump_state: true,
        };
        let (_, output) = session("<++\n", options);
        assert!(output.contains("tape    : 02 (1 cells)"));
        assert!(output.contains("steps   : 3"));
    }
}
