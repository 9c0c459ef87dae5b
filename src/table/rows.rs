//! Row validity bookkeeping.

use std::collections::BTreeSet;

/// Tracks which row slots of a table are live.
///
/// Deleted slots are kept as holes and handed out again, lowest first,
/// before the table grows.
#[derive(Debug, Default)]
pub(crate) struct RowManager {
    valid: Vec<bool>,
    free: BTreeSet<usize>,
}

impl RowManager {
    pub(crate) fn with_rows(nrows: usize) -> Self {
        Self {
            valid: vec![true; nrows],
            free: BTreeSet::new(),
        }
    }

    /// Number of allocated row slots, live or not.
    pub(crate) fn max_row(&self) -> usize {
        self.valid.len()
    }

    pub(crate) fn row_count(&self) -> usize {
        self.valid.len() - self.free.len()
    }

    pub(crate) fn is_valid(&self, row: usize) -> bool {
        self.valid.get(row).copied().unwrap_or(false)
    }

    /// Claim a row slot. Returns the row and whether a deleted slot was reused.
    pub(crate) fn add_row(&mut self) -> (usize, bool) {
        match self.free.pop_first() {
            Some(row) => {
                self.valid[row] = true;
                (row, true)
            }
            None => {
                self.valid.push(true);
                (self.valid.len() - 1, false)
            }
        }
    }

    pub(crate) fn remove_row(&mut self, row: usize) -> bool {
        if !self.is_valid(row) {
            return false;
        }
        self.valid[row] = false;
        self.free.insert(row);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.valid.clear();
        self.free.clear();
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid
            .iter()
            .enumerate()
            .filter_map(|(row, valid)| valid.then_some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut rows = RowManager::default();
        assert_eq!(rows.add_row(), (0, false));
        assert_eq!(rows.add_row(), (1, false));
        assert_eq!(rows.add_row(), (2, false));

        assert!(rows.remove_row(1));
        assert!(!rows.remove_row(1));
        assert!(!rows.remove_row(7));
        assert_eq!(rows.row_count(), 2);
        assert_eq!(rows.max_row(), 3);
        assert_eq!(rows.rows().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_reuses_lowest_hole_first() {
        let mut rows = RowManager::with_rows(4);
        rows.remove_row(3);
        rows.remove_row(1);
        assert_eq!(rows.add_row(), (1, true));
        assert_eq!(rows.add_row(), (3, true));
        assert_eq!(rows.add_row(), (4, false));
        assert_eq!(rows.row_count(), 5);
    }

    #[test]
    fn test_clear() {
        let mut rows = RowManager::with_rows(2);
        rows.remove_row(0);
        rows.clear();
        assert_eq!(rows.max_row(), 0);
        assert_eq!(rows.add_row(), (0, false));
    }
}
