mod field;
mod schema;

pub use field::{Field, Type};
pub use schema::Schema;
