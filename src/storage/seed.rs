use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info};
use rand::Rng;
use uuid::Builder;

use super::{
    memory::MemoryStore,
    tuple::{Cell, Decimal, Tuple},
};
use crate::{error::StreamError, types::StreamResult};

const FIRST_NAMES: [&str; 8] = [
    "Ada", "Brian", "Chioma", "Dmitri", "Esther", "Farouk", "Grace", "Hiro",
];
const LAST_NAMES: [&str; 6] = ["Okafor", "Lindqvist", "Mensah", "Tanaka", "Varga", "Ruiz"];

/// A random version 4 UUID, drawn from `rng` so seeded runs repeat.
pub fn new_user_id<R: Rng>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

/// Build a `user_data` row.
pub fn user_tuple(user_id: &str, name: &str, email: &str, age: Cell) -> Tuple {
    Tuple::new(vec![
        Cell::String(user_id.to_string()),
        Cell::String(name.to_string()),
        Cell::String(email.to_string()),
        age,
    ])
}

/// Fill the store with `count` random users, ages in `[18, 100)` with two
/// decimal places.
pub fn generate<R: Rng>(store: &MemoryStore, count: usize, rng: &mut R) -> StreamResult<usize> {
    for i in 0..count {
        let first = FIRST_NAMES[rng.gen_range(0, FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0, LAST_NAMES.len())];
        let name = format!("{} {}", first, last);
        let email = format!("{}.{}{}@example.com", first, last, i).to_lowercase();
        let age = Decimal::new(rng.gen_range(1800, 10000), 2)
            .ok_or_else(|| StreamError::query("age scale out of range"))?;

        store.insert(user_tuple(&new_user_id(rng), &name, &email, Cell::Decimal(age)))?;
    }

    info!("generated {} users", count);
    Ok(count)
}

pub fn load_csv<P: AsRef<Path>>(store: &MemoryStore, path: P) -> StreamResult<usize> {
    let file = File::open(path.as_ref())?;
    debug!("loading users from {}", path.as_ref().display());
    load_csv_from(store, BufReader::new(file), &mut rand::thread_rng())
}

/// Load users from CSV text with a `name,email,age` header (columns in any
/// order). A `user_id` column is used when present, otherwise ids are
/// generated. Rows with an existing id replace the stored row.
pub fn load_csv_from<B: BufRead, R: Rng>(
    store: &MemoryStore,
    reader: B,
    rng: &mut R,
) -> StreamResult<usize> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => split_csv_line(&line?),
        None => return Ok(0),
    };
    let column = |name: &str| header.iter().position(|h| h.trim() == name);
    let name_pos = column("name").ok_or_else(|| missing_column("name"))?;
    let email_pos = column("email").ok_or_else(|| missing_column("email"))?;
    let age_pos = column("age").ok_or_else(|| missing_column("age"))?;
    let id_pos = column("user_id");

    let mut count = 0;
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // header is line 1
        let line_no = i + 2;
        let fields = split_csv_line(&line);
        let field = |pos: usize| {
            fields.get(pos).map(|s| s.as_str()).ok_or_else(|| {
                StreamError::data_shape(&format!(
                    "line {}: expected {} fields",
                    line_no,
                    header.len()
                ))
            })
        };

        let age = Decimal::parse(field(age_pos)?).ok_or_else(|| {
            StreamError::data_shape(&format!("line {}: age is not a number", line_no))
        })?;
        let user_id = match id_pos {
            Some(pos) => field(pos)?.to_string(),
            None => new_user_id(rng),
        };

        store.insert(user_tuple(
            &user_id,
            field(name_pos)?,
            field(email_pos)?,
            Cell::Decimal(age),
        ))?;
        count += 1;
    }

    info!("loaded {} users", count);
    Ok(count)
}

fn missing_column(name: &str) -> StreamError {
    StreamError::data_shape(&format!("csv header has no `{}` column", name))
}

/// Split one CSV line. Fields may be wrapped in double quotes, a doubled
/// quote inside a quoted field stands for one quote character.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', _) => in_quotes = !in_quotes,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
