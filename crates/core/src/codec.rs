//! Textual board encodings.
//!
//! The grid side ("sdx") is one space-separated token per cell in row-major
//! order: `u<digit>` is a given (non-editable) cell, a bare `1`-`9` is an
//! editable filled cell, and `0` is an editable empty cell.
//!
//! Candidates travel in a separate sparse channel: space-separated
//! `row,col:d1,d2,...` entries with digits ascending, present only for cells
//! whose candidate set is non-empty. An empty string means no candidates
//! anywhere.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::cell::Cell;
use crate::grid::{CELL_COUNT, Grid};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected {CELL_COUNT} cell tokens, got {0}")]
    TokenCount(usize),
    #[error("malformed cell token {token:?} at index {index}")]
    MalformedToken { index: usize, token: String },
    #[error("malformed candidate entry {0:?}")]
    MalformedCandidates(String),
    #[error("candidate coordinate ({row},{col}) out of range")]
    CandidateOutOfRange { row: usize, col: usize },
}

/// Decodes an sdx string into a grid. Fails unless there are exactly 81
/// tokens, each matching one of the three token shapes. `u0` is malformed: a
/// given always holds a value.
pub fn decode_grid(sdx: &str) -> Result<Grid, CodecError> {
    let tokens: Vec<&str> = sdx.split_whitespace().collect();
    if tokens.len() != CELL_COUNT {
        return Err(CodecError::TokenCount(tokens.len()));
    }

    let mut cells = Vec::with_capacity(CELL_COUNT);
    for (index, token) in tokens.iter().enumerate() {
        let malformed = || CodecError::MalformedToken {
            index,
            token: token.to_string(),
        };

        let cell = if let Some(rest) = token.strip_prefix('u') {
            let value = parse_digit(rest).ok_or_else(malformed)?;
            Cell::given(value)
        } else if *token == "0" {
            Cell::editable(None)
        } else {
            let value = parse_digit(token).ok_or_else(malformed)?;
            Cell::editable(Some(value))
        };
        cells.push(cell);
    }

    Ok(Grid::from_cells(cells))
}

/// Encodes a grid back to sdx. Total: every valid grid has exactly one
/// encoding, and `decode_grid(encode_grid(g)) == g` on value/editability.
pub fn encode_grid(grid: &Grid) -> String {
    let mut sdx = String::with_capacity(CELL_COUNT * 3);
    for (_, cell) in grid.iter() {
        if !sdx.is_empty() {
            sdx.push(' ');
        }
        match (cell.is_editable(), cell.value()) {
            (false, Some(value)) => {
                let _ = write!(sdx, "u{value}");
            }
            // Unreachable for grids built through the decoder, but keeps
            // encoding total.
            (false, None) => sdx.push('0'),
            (true, Some(value)) => {
                let _ = write!(sdx, "{value}");
            }
            (true, None) => sdx.push('0'),
        }
    }
    sdx
}

/// Encodes the candidate side-channel. Cells with empty candidate sets are
/// omitted entirely.
pub fn encode_candidates(grid: &Grid) -> String {
    let mut out = String::new();
    for ((row, col), cell) in grid.iter() {
        if cell.candidates().is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{row},{col}:");
        for (i, digit) in cell.candidates().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{digit}");
        }
    }
    out
}

/// Applies an encoded candidate string onto a decoded grid. An empty string
/// means no candidates anywhere. Decoding is strict: out-of-range coordinates,
/// malformed entries, and digits outside 1-9 all fail. Candidates landing on
/// a given or a filled cell are dropped, since the cell invariant wins.
pub fn decode_candidates(encoded: &str, grid: &mut Grid) -> Result<(), CodecError> {
    if encoded.is_empty() {
        return Ok(());
    }

    for entry in encoded.split(' ') {
        let malformed = || CodecError::MalformedCandidates(entry.to_string());

        let (coords, digits) = entry.split_once(':').ok_or_else(malformed)?;
        let (row_str, col_str) = coords.split_once(',').ok_or_else(malformed)?;
        let row: usize = row_str.parse().map_err(|_| malformed())?;
        let col: usize = col_str.parse().map_err(|_| malformed())?;
        if !Grid::in_bounds(row, col) {
            return Err(CodecError::CandidateOutOfRange { row, col });
        }

        let mut candidates = BTreeSet::new();
        for digit_str in digits.split(',') {
            let digit = parse_digit(digit_str).ok_or_else(malformed)?;
            candidates.insert(digit);
        }
        if candidates.is_empty() {
            return Err(malformed());
        }

        grid.get_mut(row, col).set_candidates(candidates);
    }

    Ok(())
}

fn parse_digit(s: &str) -> Option<u8> {
    match s.parse::<u8>() {
        Ok(d) if (1..=9).contains(&d) && s.len() == 1 => Some(d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GRID_SIZE;

    fn sample_sdx() -> String {
        // Given 5 at (0,0), editable 3 at (0,1), everything else empty.
        let mut tokens = vec!["0"; CELL_COUNT];
        tokens[0] = "u5";
        tokens[1] = "3";
        tokens.join(" ")
    }

    #[test]
    fn test_decode_shapes() {
        let grid = decode_grid(&sample_sdx()).unwrap();
        assert_eq!(grid.get(0, 0).value(), Some(5));
        assert!(!grid.get(0, 0).is_editable());
        assert_eq!(grid.get(0, 1).value(), Some(3));
        assert!(grid.get(0, 1).is_editable());
        assert!(grid.get(8, 8).is_empty());
        assert!(grid.get(8, 8).is_editable());
    }

    #[test]
    fn test_grid_round_trip() {
        let sdx = sample_sdx();
        let grid = decode_grid(&sdx).unwrap();
        let encoded = encode_grid(&grid);
        assert_eq!(encoded, sdx);
        assert_eq!(decode_grid(&encoded).unwrap(), grid);
    }

    #[test]
    fn test_decode_rejects_wrong_token_count() {
        assert!(matches!(
            decode_grid("0 0 0"),
            Err(CodecError::TokenCount(3))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_tokens() {
        for bad in ["x", "10", "u0", "u10", "u", "-1"] {
            let mut tokens = vec!["0"; CELL_COUNT];
            tokens[40] = bad;
            let sdx = tokens.join(" ");
            assert!(
                matches!(decode_grid(&sdx), Err(CodecError::MalformedToken { .. })),
                "token {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_candidates_round_trip() {
        let mut grid = Grid::empty();
        for digit in [3, 1, 2] {
            grid.get_mut(0, 1).toggle_candidate(digit);
        }
        grid.get_mut(8, 8).toggle_candidate(9);

        let encoded = encode_candidates(&grid);
        assert_eq!(encoded, "0,1:1,2,3 8,8:9");

        let mut decoded = Grid::empty();
        decode_candidates(&encoded, &mut decoded).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_empty_candidate_string_is_fine() {
        let mut grid = Grid::empty();
        decode_candidates("", &mut grid).unwrap();
        assert!(grid.iter().all(|(_, c)| c.candidates().is_empty()));
    }

    #[test]
    fn test_candidates_out_of_range_fail() {
        let mut grid = Grid::empty();
        assert!(matches!(
            decode_candidates(&format!("{GRID_SIZE},0:1"), &mut grid),
            Err(CodecError::CandidateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_candidates_on_filled_cell_are_dropped() {
        let mut grid = Grid::empty();
        grid.get_mut(4, 4).set_value(6);
        decode_candidates("4,4:1,2", &mut grid).unwrap();
        assert!(grid.get(4, 4).candidates().is_empty());
    }

    #[test]
    fn test_malformed_candidate_entries_fail() {
        for bad in ["0,0", "0:1", "a,b:1", "0,0:", "0,0:0", "0,0:10"] {
            let mut grid = Grid::empty();
            assert!(
                decode_candidates(bad, &mut grid).is_err(),
                "entry {bad:?} should be rejected"
            );
        }
    }
}
