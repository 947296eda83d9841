use std::collections::BTreeSet;

/// A single cell of the 9x9 grid.
///
/// Givens are created non-editable and never change. Editable cells carry an
/// optional value plus a set of pencil-marked candidates; the two are mutually
/// exclusive, so writing a value clears the cell's own candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    value: Option<u8>,
    editable: bool,
    candidates: BTreeSet<u8>,
}

impl Cell {
    /// A non-editable cell fixed at puzzle creation.
    pub fn given(value: u8) -> Self {
        Self {
            value: Some(value),
            editable: false,
            candidates: BTreeSet::new(),
        }
    }

    pub fn editable(value: Option<u8>) -> Self {
        Self {
            value,
            editable: true,
            candidates: BTreeSet::new(),
        }
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn candidates(&self) -> &BTreeSet<u8> {
        &self.candidates
    }

    /// Sets the value, where `0` means clear. Candidates go away the moment a
    /// value lands.
    pub fn set_value(&mut self, value: u8) {
        self.value = if value == 0 { None } else { Some(value) };
        if self.value.is_some() {
            self.candidates.clear();
        }
    }

    /// Clears both value and candidates.
    pub fn clear(&mut self) {
        self.value = None;
        self.candidates.clear();
    }

    /// Flips membership of `digit` in the candidate set. Ignored on givens and
    /// on filled cells, which always keep an empty set.
    pub fn toggle_candidate(&mut self, digit: u8) {
        if !self.editable || self.value.is_some() {
            return;
        }
        if !self.candidates.remove(&digit) {
            self.candidates.insert(digit);
        }
    }

    /// Replaces the candidate set wholesale. Ignored on givens and filled
    /// cells.
    pub fn set_candidates(&mut self, candidates: BTreeSet<u8>) {
        if self.editable && self.value.is_none() {
            self.candidates = candidates;
        }
    }

    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_clears_candidates() {
        let mut cell = Cell::editable(None);
        cell.toggle_candidate(1);
        cell.toggle_candidate(2);
        cell.toggle_candidate(3);
        assert_eq!(cell.candidates().len(), 3);

        cell.set_value(2);
        assert_eq!(cell.value(), Some(2));
        assert!(cell.candidates().is_empty());
    }

    #[test]
    fn test_set_value_zero_clears() {
        let mut cell = Cell::editable(Some(4));
        cell.set_value(0);
        assert!(cell.is_empty());
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut cell = Cell::editable(None);
        cell.toggle_candidate(7);
        assert!(cell.candidates().contains(&7));
        cell.toggle_candidate(7);
        assert!(cell.candidates().is_empty());
    }

    #[test]
    fn test_given_never_holds_candidates() {
        let mut cell = Cell::given(5);
        cell.toggle_candidate(3);
        cell.set_candidates([1, 2].into_iter().collect());
        assert!(cell.candidates().is_empty());
    }

    #[test]
    fn test_filled_cell_rejects_candidates() {
        let mut cell = Cell::editable(Some(9));
        cell.toggle_candidate(1);
        assert!(cell.candidates().is_empty());
    }
}
