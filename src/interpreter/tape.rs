//! The machine's growable byte tape

/// Zero-initialised cells that grow to the right on demand.
///
/// Cells beyond the allocated length read as zero, so the tape only
/// allocates as far as the data pointer has actually travelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
}

impl Tape {
    pub fn new() -> Self {
        Tape { cells: vec![0] }
    }

    /// Tape pre-seeded with `cells`; used by tests and the debugger.
    pub fn from_cells(cells: Vec<u8>) -> Self {
        if cells.is_empty() {
            return Self::new();
        }
        Tape { cells }
    }

    pub fn get(&self, index: usize) -> u8 {
        self.cells.get(index).copied().unwrap_or(0)
    }

    /// Mutable access to `index`, growing the tape if needed.
    pub fn cell_mut(&mut self, index: usize) -> &mut u8 {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, 0);
        }
        &mut self.cells[index]
    }

    /// Number of allocated cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unallocated_cells_read_zero() {
        let tape = Tape::new();
        assert_eq!(tape.get(0), 0);
        assert_eq!(tape.get(1000), 0);
        assert_eq!(tape.len(), 1);
    }

    #[test]
    fn test_grows_on_write() {
        let mut tape = Tape::new();
        *tape.cell_mut(4) = 9;
        assert_eq!(tape.len(), 5);
        assert_eq!(tape.cells(), &[0, 0, 0, 0, 9]);
    }
}
