use crate::cell::Cell;

pub const GRID_SIZE: usize = 9;
pub const BOX_SIZE: usize = 3;
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// The 9x9 board grid, row-major and 0-indexed. Owned exclusively by the
/// `Board` that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from exactly 81 row-major cells.
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), CELL_COUNT);
        Self { cells }
    }

    /// An all-editable, all-empty grid.
    pub fn empty() -> Self {
        Self {
            cells: (0..CELL_COUNT).map(|_| Cell::editable(None)).collect(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row * GRID_SIZE + col]
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.cells[row * GRID_SIZE + col]
    }

    pub fn in_bounds(row: usize, col: usize) -> bool {
        row < GRID_SIZE && col < GRID_SIZE
    }

    /// Row-major iteration over `((row, col), cell)`.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| ((i / GRID_SIZE, i % GRID_SIZE), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_indexing() {
        let mut grid = Grid::empty();
        grid.get_mut(2, 3).set_value(7);

        let found: Vec<_> = grid
            .iter()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(coord, _)| coord)
            .collect();
        assert_eq!(found, vec![(2, 3)]);
    }

    #[test]
    fn test_bounds() {
        assert!(Grid::in_bounds(8, 8));
        assert!(!Grid::in_bounds(9, 0));
        assert!(!Grid::in_bounds(0, 9));
    }
}
