// Snapshot management for reverse execution

use crate::interpreter::{Engine, EngineConfig, MachineState, Program, StepOutcome};
use thiserror::Error;
use tracing::{debug, warn};

/// Fixed per-snapshot overhead used by the size estimate
const SNAPSHOT_OVERHEAD: usize = 64;

/// History navigation and recording failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("already at the beginning of execution")]
    AtStart,

    #[error("no more snapshots available (execution finished)")]
    AtEnd,

    #[error("snapshot memory limit exceeded: {current} + {requested} > {limit} bytes")]
    SnapshotLimitExceeded {
        current: usize,
        requested: usize,
        limit: usize,
    },
}

/// Snapshot of execution state after one instruction
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub state: MachineState,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        self.state.tape.len() + SNAPSHOT_OVERHEAD
    }
}

/// Bounded list of snapshots
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), HistoryError> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(HistoryError::SnapshotLimitExceeded {
                current: self.current_memory,
                requested: snapshot_size,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

/// How a recorded execution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ending {
    /// The program halted normally
    Completed,
    /// The program failed; `instruction` is where, when known
    Failed {
        message: String,
        instruction: Option<usize>,
    },
    /// Recording stopped because the snapshot memory limit was reached
    Truncated,
}

/// A fully recorded execution that can be stepped in both directions
#[derive(Debug)]
pub struct History {
    program: Program,
    snapshots: SnapshotManager,
    /// Everything the program wrote; each snapshot sees a prefix of it
    output: Vec<u8>,
    position: usize,
    ending: Ending,
}

impl History {
    /// Run `program` to completion against `input`, capturing a snapshot
    /// before the first instruction and after every executed one.
    pub fn record(
        program: Program,
        config: EngineConfig,
        input: &[u8],
        memory_limit: usize,
    ) -> History {
        let mut snapshots = SnapshotManager::new(memory_limit);
        let mut output = Vec::new();
        let mut input = input;

        let ending = {
            let mut engine = Engine::new(&program, config);
            Self::record_into(&mut engine, &mut snapshots, &mut input, &mut output)
        };

        debug!(
            snapshots = snapshots.len(),
            memory = snapshots.memory_usage(),
            ?ending,
            "recorded execution history"
        );

        History {
            program,
            snapshots,
            output,
            position: 0,
            ending,
        }
    }

    fn record_into(
        engine: &mut Engine<'_>,
        snapshots: &mut SnapshotManager,
        input: &mut &[u8],
        output: &mut Vec<u8>,
    ) -> Ending {
        let mut push = |engine: &Engine<'_>| -> bool {
            match snapshots.push(Snapshot {
                state: engine.state(),
            }) {
                Ok(()) => true,
                Err(e) => {
                    warn!("{}; history is truncated", e);
                    false
                }
            }
        };

        if !push(engine) {
            return Ending::Truncated;
        }

        loop {
            let before = engine.steps();
            let outcome = engine.step(input, output);

            if engine.steps() > before && !push(engine) {
                return Ending::Truncated;
            }

            match outcome {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Halted(_)) => return Ending::Completed,
                Err(e) => {
                    return Ending::Failed {
                        message: e.to_string(),
                        instruction: e.instruction(),
                    }
                }
            }
        }
    }

    /// Step forward to the next recorded snapshot
    pub fn step_forward(&mut self) -> Result<(), HistoryError> {
        if self.position + 1 >= self.snapshots.len() {
            return Err(HistoryError::AtEnd);
        }
        self.position += 1;
        Ok(())
    }

    /// Step backward to the previous snapshot
    pub fn step_backward(&mut self) -> Result<(), HistoryError> {
        if self.position == 0 {
            return Err(HistoryError::AtStart);
        }
        self.position -= 1;
        Ok(())
    }

    /// Rewind to the beginning of execution history
    pub fn rewind_to_start(&mut self) {
        self.position = 0;
    }

    /// Jump to the last recorded snapshot
    pub fn jump_to_end(&mut self) {
        self.position = self.snapshots.len().saturating_sub(1);
    }

    /// Snapshot at the current position
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.position)
    }

    /// Output produced up to the current position
    pub fn output_so_far(&self) -> &[u8] {
        let written = self
            .current()
            .map_or(0, |snapshot| snapshot.state.output_bytes as usize);
        &self.output[..written.min(self.output.len())]
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Estimated bytes held by recorded snapshots
    pub fn memory_usage(&self) -> usize {
        self.snapshots.memory_usage()
    }

    pub fn memory_limit(&self) -> usize {
        self.snapshots.memory_limit()
    }

    pub fn is_at_end(&self) -> bool {
        self.position + 1 >= self.snapshots.len()
    }

    pub fn ending(&self) -> &Ending {
        &self.ending
    }
}
