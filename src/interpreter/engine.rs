// Execution engine for the tape machine

use super::errors::RuntimeError;
use super::program::Program;
use super::tape::Tape;
use crate::alphabet::Instruction;
use serde::Deserialize;
use std::fmt;
use std::io::{self, Read, Write};
use tracing::debug;

/// What `<` does on cell 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderflowPolicy {
    /// Fail with [`RuntimeError::TapeUnderflow`]
    #[default]
    Error,
    /// Stay on cell 0
    Clamp,
}

/// What `,` does once the input source is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EofPolicy {
    /// Store 0 in the current cell
    #[default]
    Zero,
    /// Leave the current cell as it is
    Unchanged,
    /// Stop the program successfully
    Halt,
}

/// Tunable execution limits and policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Maximum number of executed instructions (`None` = unbounded)
    pub step_limit: Option<u64>,
    /// Maximum number of tape cells (`None` = bounded only by memory)
    pub max_tape_len: Option<usize>,
    pub underflow: UnderflowPolicy,
    pub eof: EofPolicy,
}

/// Why the machine stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    EndOfProgram,
    InputExhausted,
}

/// Result of a single [`Engine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted(HaltReason),
}

/// Totals reported by [`Engine::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub output_bytes: u64,
    pub halted_by: HaltReason,
}

/// Complete machine state, as captured by the debugger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub tape: Tape,
    pub data_pointer: usize,
    pub instruction_pointer: usize,
    pub steps: u64,
    pub output_bytes: u64,
    pub halted: Option<HaltReason>,
}

/// Cells printed by the [`MachineState`] dump before it elides the rest
const DUMP_CELLS: usize = 64;

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.tape.cells();
        write!(f, "tape    :")?;
        for cell in cells.iter().take(DUMP_CELLS) {
            write!(f, " {:02x}", cell)?;
        }
        if cells.len() > DUMP_CELLS {
            write!(f, " ...")?;
        }
        writeln!(f, " ({} cells)", cells.len())?;
        writeln!(f, "pointer : {}", self.data_pointer)?;
        writeln!(f, "ip      : {}", self.instruction_pointer)?;
        writeln!(f, "steps   : {}", self.steps)?;
        writeln!(f, "output  : {} bytes", self.output_bytes)
    }
}

/// Interpreter for a loaded [`Program`]
pub struct Engine<'p> {
    /// Program being executed
    program: &'p Program,

    config: EngineConfig,

    /// Memory cells
    tape: Tape,

    data_pointer: usize,

    instruction_pointer: usize,

    /// Instructions completed so far (the end marker is not counted)
    steps: u64,

    output_bytes: u64,

    /// Set once the machine has stopped
    halted: Option<HaltReason>,
}

impl<'p> Engine<'p> {
    /// Create an engine with a fresh, all-zero tape
    pub fn new(program: &'p Program, config: EngineConfig) -> Self {
        Self::with_tape(program, config, Tape::new())
    }

    /// Create an engine over a pre-seeded tape
    pub fn with_tape(program: &'p Program, config: EngineConfig, tape: Tape) -> Self {
        Engine {
            program,
            config,
            tape,
            data_pointer: 0,
            instruction_pointer: 0,
            steps: 0,
            output_bytes: 0,
            halted: None,
        }
    }

    /// Run the program until it halts or fails
    pub fn run(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<RunSummary, RuntimeError> {
        let halted_by = loop {
            if let StepOutcome::Halted(reason) = self.step(input, output)? {
                break reason;
            }
        };
        output.flush()?;

        debug!(
            steps = self.steps,
            output_bytes = self.output_bytes,
            tape_cells = self.tape.len(),
            "program halted"
        );

        Ok(RunSummary {
            steps: self.steps,
            output_bytes: self.output_bytes,
            halted_by,
        })
    }

    /// Execute one instruction
    pub fn step(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<StepOutcome, RuntimeError> {
        if let Some(reason) = self.halted {
            return Ok(StepOutcome::Halted(reason));
        }

        let ip = self.instruction_pointer;
        let instruction = self.program.get(ip).unwrap_or(Instruction::EndOfProgram);

        if instruction == Instruction::EndOfProgram {
            return Ok(self.halt(HaltReason::EndOfProgram));
        }

        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        let mut next = ip + 1;

        match instruction {
            Instruction::MoveRight => {
                let target = self.data_pointer + 1;
                if let Some(limit) = self.config.max_tape_len {
                    if target >= limit {
                        return Err(RuntimeError::TapeOverflow { ip, limit });
                    }
                }
                self.data_pointer = target;
            }
            Instruction::MoveLeft => match self.data_pointer.checked_sub(1) {
                Some(target) => self.data_pointer = target,
                None => match self.config.underflow {
                    UnderflowPolicy::Error => return Err(RuntimeError::TapeUnderflow { ip }),
                    UnderflowPolicy::Clamp => {}
                },
            },
            Instruction::Increment => {
                let cell = self.tape.cell_mut(self.data_pointer);
                *cell = cell.wrapping_add(1);
            }
            Instruction::Decrement => {
                let cell = self.tape.cell_mut(self.data_pointer);
                *cell = cell.wrapping_sub(1);
            }
            Instruction::Output => {
                output.write_all(&[self.current_cell()])?;
                self.output_bytes += 1;
            }
            Instruction::Input => {
                // Make any prompt visible before blocking on input
                output.flush()?;
                match read_byte(input)? {
                    Some(byte) => *self.tape.cell_mut(self.data_pointer) = byte,
                    None => match self.config.eof {
                        EofPolicy::Zero => *self.tape.cell_mut(self.data_pointer) = 0,
                        EofPolicy::Unchanged => {}
                        EofPolicy::Halt => {
                            self.steps += 1;
                            self.instruction_pointer = next;
                            return Ok(self.halt(HaltReason::InputExhausted));
                        }
                    },
                }
            }
            Instruction::LoopOpen => {
                if self.current_cell() == 0 {
                    next = self.partner(ip) + 1;
                }
            }
            Instruction::LoopClose => {
                if self.current_cell() != 0 {
                    next = self.partner(ip) + 1;
                }
            }
            Instruction::EndOfProgram => return Ok(self.halt(HaltReason::EndOfProgram)),
        }

        self.steps += 1;
        self.instruction_pointer = next;
        Ok(StepOutcome::Continue)
    }

    fn halt(&mut self, reason: HaltReason) -> StepOutcome {
        self.halted = Some(reason);
        StepOutcome::Halted(reason)
    }

    /// Matching bracket; loading guarantees every bracket has one.
    fn partner(&self, ip: usize) -> usize {
        self.program.jump_target(ip).unwrap_or(ip)
    }

    fn current_cell(&self) -> u8 {
        self.tape.get(self.data_pointer)
    }

    // ========== Getter methods for the debugger ==========

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn data_pointer(&self) -> usize {
        self.data_pointer
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Capture the full machine state
    pub fn state(&self) -> MachineState {
        MachineState {
            tape: self.tape.clone(),
            data_pointer: self.data_pointer,
            instruction_pointer: self.instruction_pointer,
            steps: self.steps,
            output_bytes: self.output_bytes,
            halted: self.halted,
        }
    }

    /// Restore a previously captured state
    pub fn restore(&mut self, state: &MachineState) {
        self.tape = state.tape.clone();
        self.data_pointer = state.data_pointer;
        self.instruction_pointer = state.instruction_pointer;
        self.steps = state.steps;
        self.output_bytes = state.output_bytes;
        self.halted = state.halted;
    }
}

/// Read a single byte, `None` once the source is exhausted
fn read_byte(input: &mut dyn Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::lex;

    fn run_source(
        source: &str,
        input: &[u8],
        config: EngineConfig,
    ) -> (Result<RunSummary, RuntimeError>, Vec<u8>) {
        let program = Program::load(&lex(source)).unwrap();
        let mut engine = Engine::new(&program, config);
        let mut output = Vec::new();
        let result = engine.run(&mut &input[..], &mut output);
        (result, output)
    }

    #[test]
    fn test_increment_and_output() {
        let (result, output) = run_source("+++++.", b"", EngineConfig::default());
        let summary = result.unwrap();
        assert_eq!(output, vec![0x05]);
        assert_eq!(summary.steps, 6);
        assert_eq!(summary.halted_by, HaltReason::EndOfProgram);
    }

    #[test]
    fn test_cell_clearing_loop_runs_body_three_times() {
        let program = Program::load(&lex("[-]")).unwrap();
        let mut engine =
            Engine::with_tape(&program, EngineConfig::default(), Tape::from_cells(vec![3]));
        let mut body_runs = 0;

        loop {
            if engine.instruction_pointer() == 1 {
                body_runs += 1;
            }
            let outcome = engine.step(&mut io::empty(), &mut io::sink()).unwrap();
            if outcome != StepOutcome::Continue {
                break;
            }
        }

        assert_eq!(body_runs, 3);
        assert_eq!(engine.tape().get(0), 0);
    }

    #[test]
    fn test_skips_loop_on_zero_cell() {
        let (result, output) = run_source("[.]+.", b"", EngineConfig::default());
        assert!(result.is_ok());
        assert_eq!(output, vec![1]);
    }

    #[test]
    fn test_cells_wrap() {
        let (_, output) = run_source("-.+.", b"", EngineConfig::default());
        assert_eq!(output, vec![255, 0]);
    }

    #[test]
    fn test_hello_world() {
        let source = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
        let (result, output) = run_source(source, b"", EngineConfig::default());
        assert!(result.is_ok());
        assert_eq!(output, b"Hello World!\n");
    }

    #[test]
    fn test_echo_input() {
        let (_, output) = run_source(",.,.,.", b"abc", EngineConfig::default());
        assert_eq!(output, b"abc");
    }

    #[test]
    fn test_underflow_is_an_error_by_default() {
        let (result, _) = run_source("+<", b"", EngineConfig::default());
        assert!(matches!(result, Err(RuntimeError::TapeUnderflow { ip: 1 })));
    }

    #[test]
    fn test_underflow_clamp_policy() {
        let config = EngineConfig {
            underflow: UnderflowPolicy::Clamp,
            ..EngineConfig::default()
        };
        let (result, output) = run_source("+<<<.", b"", config);
        assert!(result.is_ok());
        assert_eq!(output, vec![1]);
    }

    #[test]
    fn test_exhausted_input_stores_zero_by_default() {
        let (result, output) = run_source("+++,.", b"", EngineConfig::default());
        assert!(result.is_ok());
        assert_eq!(output, vec![0]);
    }

    #[test]
    fn test_exhausted_input_unchanged_policy() {
        let config = EngineConfig {
            eof: EofPolicy::Unchanged,
            ..EngineConfig::default()
        };
        let (_, output) = run_source("+++,.", b"", config);
        assert_eq!(output, vec![3]);
    }

    #[test]
    fn test_exhausted_input_halt_policy() {
        let config = EngineConfig {
            eof: EofPolicy::Halt,
            ..EngineConfig::default()
        };
        let (result, output) = run_source(",.,.", b"x", config);
        assert_eq!(result.unwrap().halted_by, HaltReason::InputExhausted);
        assert_eq!(output, b"x");
    }

    #[test]
    fn test_step_limit_trips_on_infinite_loop() {
        let config = EngineConfig {
            step_limit: Some(1000),
            ..EngineConfig::default()
        };
        let (result, _) = run_source("+[]", b"", config);
        let err = result.unwrap_err();
        assert!(err.is_fuse());
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 1000 }));
    }

    #[test]
    fn test_step_limit_allows_exact_budget() {
        let config = EngineConfig {
            step_limit: Some(3),
            ..EngineConfig::default()
        };
        let (result, _) = run_source("+++", b"", config);
        assert_eq!(result.unwrap().steps, 3);
    }

    #[test]
    fn test_tape_overflow() {
        let config = EngineConfig {
            max_tape_len: Some(2),
            ..EngineConfig::default()
        };
        let (result, _) = run_source(">>", b"", config);
        assert!(matches!(
            result,
            Err(RuntimeError::TapeOverflow { ip: 1, limit: 2 })
        ));
    }

    #[test]
    fn test_state_restore() {
        let program = Program::load(&lex("+>++")).unwrap();
        let mut engine = Engine::new(&program, EngineConfig::default());
        engine.step(&mut io::empty(), &mut io::sink()).unwrap();
        let saved = engine.state();

        engine.run(&mut io::empty(), &mut io::sink()).unwrap();
        assert!(engine.is_halted());

        engine.restore(&saved);
        assert!(!engine.is_halted());
        assert_eq!(engine.instruction_pointer(), 1);
        assert_eq!(engine.tape().cells(), &[1]);
    }

    #[test]
    fn test_state_dump() {
        let program = Program::load(&lex("+++++>+.")).unwrap();
        let mut engine = Engine::new(&program, EngineConfig::default());
        engine.run(&mut io::empty(), &mut io::sink()).unwrap();

        assert_eq!(
            engine.state().to_string(),
            "tape    : 05 01 (2 cells)\n\
             pointer : 1\n\
             ip      : 8\n\
             steps   : 8\n\
             output  : 1 bytes\n"
        );
    }

    #[test]
    fn test_state_dump_elides_long_tapes() {
        let state = MachineState {
            tape: Tape::from_cells(vec![0; 100]),
            data_pointer: 99,
            instruction_pointer: 0,
            steps: 0,
            output_bytes: 0,
            halted: None,
        };
        let dump = state.to_string();
        assert!(dump.starts_with("tape    : 00 00"));
        assert!(dump.contains(" ... (100 cells)"));
    }
}
