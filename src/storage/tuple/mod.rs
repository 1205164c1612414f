mod cell;
mod tuple;

pub use cell::{Cell, Decimal};
pub use tuple::Tuple;
