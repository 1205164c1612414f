use std::fmt;

use serde::Serialize;

use crate::{
    error::StreamError,
    storage::{Cell, Schema, Tuple},
    types::StreamResult,
};

/// A user's age after normalization: whole values are integers, everything
/// else keeps its fraction. `30.00` becomes `Int(30)`, `30.50` becomes
/// `Frac(30.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Age {
    Int(i64),
    Frac(f64),
}

impl Age {
    /// `None` for NaN and infinities.
    pub fn from_f64(v: f64) -> Option<Age> {
        if !v.is_finite() {
            return None;
        }
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            return Some(Age::Int(v as i64));
        }
        Some(Age::Frac(v))
    }

    /// `None` for null, text and non-finite cells.
    pub fn from_cell(cell: &Cell) -> Option<Age> {
        match cell {
            Cell::Int64(v) => Some(Age::Int(*v)),
            Cell::Decimal(d) if d.is_integral() => Some(Age::Int(d.trunc())),
            Cell::Decimal(d) => Some(Age::Frac(d.to_f64())),
            Cell::Float64(v) => Age::from_f64(*v),
            Cell::Null | Cell::String(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Age::Int(v) => *v as f64,
            Age::Frac(v) => *v,
        }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Age::Int(v) => write!(f, "{}", v),
            Age::Frac(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub age: Age,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{user_id: {}, name: {}, email: {}, age: {}}}",
            self.user_id, self.name, self.email, self.age
        )
    }
}

/// Positions of the user columns inside a row, resolved once per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserLayout {
    user_id: usize,
    name: usize,
    email: usize,
    age: usize,
}

impl UserLayout {
    pub fn of(schema: &Schema) -> StreamResult<Self> {
        let pos = |name: &str| {
            schema.get_field_pos(name).ok_or_else(|| {
                StreamError::data_shape(&format!("table has no `{}` column", name))
            })
        };

        Ok(Self {
            user_id: pos("user_id")?,
            name: pos("name")?,
            email: pos("email")?,
            age: pos("age")?,
        })
    }

    /// Turn a raw row into a `User`, failing with a data shape error when a
    /// field is missing or has the wrong type.
    pub fn decode(&self, tuple: &Tuple) -> StreamResult<User> {
        let user_id = match self.cell(tuple, self.user_id, "user_id")? {
            Cell::String(v) => v.clone(),
            Cell::Int64(v) => v.to_string(),
            other => return Err(wrong_type("user_id", other)),
        };
        let name = self.text(tuple, self.name, "name")?;
        let email = self.text(tuple, self.email, "email")?;

        let cell = self.cell(tuple, self.age, "age")?;
        let age = Age::from_cell(cell).ok_or_else(|| wrong_type("age", cell))?;

        Ok(User {
            user_id,
            name,
            email,
            age,
        })
    }

    fn cell<'t>(&self, tuple: &'t Tuple, pos: usize, name: &str) -> StreamResult<&'t Cell> {
        tuple.get_cell(pos).ok_or_else(|| {
            StreamError::data_shape(&format!("row {} has no `{}` field", tuple, name))
        })
    }

    fn text(&self, tuple: &Tuple, pos: usize, name: &str) -> StreamResult<String> {
        match self.cell(tuple, pos, name)? {
            Cell::String(v) => Ok(v.clone()),
            other => Err(wrong_type(name, other)),
        }
    }
}

fn wrong_type(name: &str, cell: &Cell) -> StreamError {
    StreamError::data_shape(&format!("`{}` has an unexpected value: {}", name, cell))
}
