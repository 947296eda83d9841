//! The per-puzzle aggregate: current grid, reference solution, and the
//! incorrect-cell snapshot from the last explicit solution check.

use crate::candidates;
use crate::codec::{self, CodecError};
use crate::grid::Grid;

pub type PuzzleId = u32;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("candidate digit must be between 1 and 9, got {0}")]
    InvalidDigit(u8),
}

#[derive(Debug, Clone)]
pub struct Board {
    puzzle_id: PuzzleId,
    title: String,
    difficulty: String,
    grid: Grid,
    solution: Grid,
    incorrect: Vec<(usize, usize)>,
    dirty: bool,
}

impl Board {
    /// Decodes a board from its stored encodings. The solution grid is fixed
    /// here and never mutated afterwards.
    pub fn decode(
        puzzle_id: PuzzleId,
        title: &str,
        difficulty: &str,
        sdx: &str,
        candidates: &str,
        solution_sdx: &str,
    ) -> Result<Self, CodecError> {
        let mut grid = codec::decode_grid(sdx)?;
        codec::decode_candidates(candidates, &mut grid)?;
        let solution = codec::decode_grid(solution_sdx)?;

        Ok(Self {
            puzzle_id,
            title: title.to_string(),
            difficulty: difficulty.to_string(),
            grid,
            solution,
            incorrect: Vec::new(),
            dirty: false,
        })
    }

    pub fn puzzle_id(&self) -> PuzzleId {
        self.puzzle_id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn incorrect(&self) -> &[(usize, usize)] {
        &self.incorrect
    }

    /// The board heading sent with every `updatePuzzle`: title followed by
    /// the upper-cased difficulty.
    pub fn heading(&self) -> String {
        format!("{}  {}", self.title, self.difficulty.to_uppercase())
    }

    /// Current grid and candidate encodings, for persistence.
    pub fn encoded(&self) -> (String, String) {
        (
            codec::encode_grid(&self.grid),
            codec::encode_candidates(&self.grid),
        )
    }

    /// Takes and resets the dirty flag. Set by every grid mutation that
    /// actually changed something.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Sets a cell value (`0` clears). No-op on givens. Does not recompute
    /// the incorrect-cell snapshot.
    pub fn set_cell(&mut self, row: usize, col: usize, value: u8) {
        let cell = self.grid.get_mut(row, col);
        if !cell.is_editable() {
            return;
        }
        cell.set_value(value);
        self.dirty = true;
    }

    /// Flips one candidate digit. No-op on givens and filled cells.
    pub fn toggle_candidate(&mut self, row: usize, col: usize, digit: u8) -> Result<(), BoardError> {
        if !(1..=9).contains(&digit) {
            return Err(BoardError::InvalidDigit(digit));
        }
        let cell = self.grid.get_mut(row, col);
        if !cell.is_editable() || !cell.is_empty() {
            return Ok(());
        }
        cell.toggle_candidate(digit);
        self.dirty = true;
        Ok(())
    }

    /// Clears value and candidates of every editable cell; givens are
    /// untouched.
    pub fn clear_board(&mut self) {
        for row in 0..crate::grid::GRID_SIZE {
            for col in 0..crate::grid::GRID_SIZE {
                let cell = self.grid.get_mut(row, col);
                if cell.is_editable() {
                    cell.clear();
                }
            }
        }
        self.dirty = true;
    }

    /// Full-board candidate refresh from current values.
    pub fn refresh_candidates(&mut self) {
        candidates::refresh_all(&mut self.grid);
        self.dirty = true;
    }

    /// Point-in-time snapshot of the editable, non-empty cells disagreeing
    /// with the solution. Not kept live; a later `set_cell` does not update
    /// it until the next explicit check.
    pub fn recompute_incorrect(&mut self) {
        self.incorrect.clear();
        for ((row, col), cell) in self.grid.iter() {
            if !cell.is_editable() || cell.is_empty() {
                continue;
            }
            if cell.value() != self.solution.get(row, col).value() {
                self.incorrect.push((row, col));
            }
        }
    }

    /// Removes one tracked coordinate if present. Idempotent.
    pub fn remove_incorrect(&mut self, row: usize, col: usize) {
        self.incorrect.retain(|&coord| coord != (row, col));
    }

    pub fn clear_incorrect(&mut self) {
        self.incorrect.clear();
    }

    /// True iff every cell, given or editable, equals its solution
    /// counterpart. A single unset editable cell makes this false.
    pub fn is_solved(&self) -> bool {
        self.grid.iter().all(|((row, col), cell)| {
            !cell.is_empty() && cell.value() == self.solution.get(row, col).value()
        })
    }
}
