//! Constraint engine: which digits can still go in a cell.
//!
//! Recomputation is pull-based. Placing a value clears that cell's own
//! candidate set, but peer cells keep whatever they had until their own
//! recompute or toggle; there is no automatic propagation.

use std::collections::BTreeSet;

use crate::grid::{BOX_SIZE, GRID_SIZE, Grid};

/// Digits already present in the cell's row, column, or 3x3 box. Givens and
/// editable filled cells both count as occupying their houses.
fn occupied(grid: &Grid, row: usize, col: usize) -> BTreeSet<u8> {
    let mut taken = BTreeSet::new();

    for j in 0..GRID_SIZE {
        if let Some(value) = grid.get(row, j).value() {
            taken.insert(value);
        }
    }

    for i in 0..GRID_SIZE {
        if let Some(value) = grid.get(i, col).value() {
            taken.insert(value);
        }
    }

    let box_row = (row / BOX_SIZE) * BOX_SIZE;
    let box_col = (col / BOX_SIZE) * BOX_SIZE;
    for i in box_row..box_row + BOX_SIZE {
        for j in box_col..box_col + BOX_SIZE {
            if let Some(value) = grid.get(i, j).value() {
                taken.insert(value);
            }
        }
    }

    taken
}

/// Valid candidates for an empty cell: `{1..9}` minus everything occupied in
/// its row, column, and box. A filled cell computes to the empty set.
pub fn compute(grid: &Grid, row: usize, col: usize) -> BTreeSet<u8> {
    if !grid.get(row, col).is_empty() {
        return BTreeSet::new();
    }

    let taken = occupied(grid, row, col);
    (1..=9).filter(|d| !taken.contains(d)).collect()
}

/// Single-digit membership test against the same exclusion set.
pub fn is_valid(grid: &Grid, row: usize, col: usize, digit: u8) -> bool {
    (1..=9).contains(&digit) && !occupied(grid, row, col).contains(&digit)
}

/// Full-board refresh: recompute the candidate set of every empty editable
/// cell from current values.
pub fn refresh_all(grid: &mut Grid) {
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            if grid.get(row, col).is_editable() && grid.get(row, col).is_empty() {
                let candidates = compute(grid, row, col);
                grid.get_mut(row, col).set_candidates(candidates);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(values: &[(usize, usize, u8)]) -> Grid {
        let mut grid = Grid::empty();
        for &(row, col, value) in values {
            grid.get_mut(row, col).set_value(value);
        }
        grid
    }

    #[test]
    fn test_compute_excludes_row_col_box() {
        // 4 in the same row, 7 in the same column, 2 in the same box.
        let grid = grid_with(&[(0, 8, 4), (8, 0, 7), (1, 1, 2)]);
        let candidates = compute(&grid, 0, 0);

        assert!(!candidates.contains(&4));
        assert!(!candidates.contains(&7));
        assert!(!candidates.contains(&2));
        assert_eq!(candidates.len(), 6);
    }

    #[test]
    fn test_compute_on_filled_cell_is_empty() {
        let grid = grid_with(&[(3, 3, 5)]);
        assert!(compute(&grid, 3, 3).is_empty());
    }

    #[test]
    fn test_unconstrained_cell_has_all_nine() {
        let grid = Grid::empty();
        let candidates = compute(&grid, 4, 4);
        assert_eq!(candidates, (1..=9).collect());
    }

    #[test]
    fn test_is_valid() {
        let grid = grid_with(&[(0, 3, 9)]);
        assert!(!is_valid(&grid, 0, 0, 9));
        assert!(is_valid(&grid, 1, 0, 9));
        assert!(!is_valid(&grid, 0, 0, 0));
        assert!(!is_valid(&grid, 0, 0, 10));
    }

    #[test]
    fn test_refresh_all_skips_filled_cells() {
        let mut grid = grid_with(&[(0, 0, 1)]);
        refresh_all(&mut grid);

        assert!(grid.get(0, 0).candidates().is_empty());
        assert!(!grid.get(0, 1).candidates().contains(&1));
        assert!(grid.get(8, 8).candidates().contains(&1));
    }

    #[test]
    fn test_no_propagation_on_value_change() {
        let mut grid = Grid::empty();
        refresh_all(&mut grid);
        assert!(grid.get(0, 1).candidates().contains(&5));

        // Filling (0,0) does not retract 5 from its peers.
        grid.get_mut(0, 0).set_value(5);
        assert!(grid.get(0, 1).candidates().contains(&5));
    }
}
