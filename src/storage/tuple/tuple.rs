use std::fmt;

use itertools::Itertools;

use super::Cell;

/// A raw row as handed out by a row store: one cell per schema field, in
/// schema order.
#[derive(Clone, PartialEq, Eq)]
pub struct Tuple {
    cells: Vec<Cell>,
}

// constructors
impl Tuple {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

impl Tuple {
    /// Get the cell at position `i`, `None` if the row is narrower than
    /// that.
    pub fn get_cell(&self, i: usize) -> Option<&Cell> {
        self.cells.get(i)
    }

    pub fn get_cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.cells.iter().join(", "))
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}
