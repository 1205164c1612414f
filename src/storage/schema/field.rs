#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Type {
    Int64,
    Float64,

    /// Fixed-point number, e.g. `DECIMAL(5,2)`.
    Decimal,

    /// Variable length text, e.g. `CHAR(36)` or `VARCHAR(255)`.
    Text,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Field {
    pub name: String,
    pub t: Type,
    pub is_primary: bool,
}

impl Field {
    pub fn new(field_name: &str, field_type: Type, is_primary: bool) -> Field {
        Field {
            t: field_type,
            name: field_name.to_string(),
            is_primary,
        }
    }
}
