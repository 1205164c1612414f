mod memory;
mod predicate;
pub mod schema;
pub mod seed;
mod store;
pub mod tuple;

pub use memory::{MemoryStore, StoreStats};
pub use predicate::{Op, Predicate};
pub use schema::{Field, Schema, Type};
pub use store::{Connection, RowStore, ScanQuery, Session};
pub use tuple::{Cell, Decimal, Tuple};
