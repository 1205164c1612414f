use std::fmt;

use super::tuple::{Cell, Tuple};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Equals,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
    NotEquals,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Op::Equals => "=",
            Op::GreaterThan => ">",
            Op::GreaterThanOrEq => ">=",
            Op::LessThan => "<",
            Op::LessThanOrEq => "<=",
            Op::NotEquals => "<>",
        };
        write!(f, "{}", s)
    }
}

/// `row[field_index] <op> cell`
///
/// A null cell never matches, whatever the operator.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub field_index: usize,
    pub op: Op,
    pub cell: Cell,
}

impl Predicate {
    pub fn new(field_index: usize, op: Op, cell: &Cell) -> Self {
        Self {
            field_index,
            op,
            cell: cell.clone(),
        }
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        let field = match tuple.get_cell(self.field_index) {
            Some(field) if !field.is_null() => field,
            _ => return false,
        };

        match self.op {
            Op::Equals => field == &self.cell,
            Op::GreaterThan => field > &self.cell,
            Op::GreaterThanOrEq => field >= &self.cell,
            Op::LessThan => field < &self.cell,
            Op::LessThanOrEq => field <= &self.cell,
            Op::NotEquals => field != &self.cell,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {} {}", self.field_index, self.op, self.cell)
    }
}
