#![allow(dead_code)]

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use cursor_stream::storage::{
    seed::user_tuple,
    tuple::{Cell, Decimal},
    MemoryStore,
};
use log::debug;
use rand::prelude::*;

/// Id of the `i`-th user created by the helpers below. Zero padded, so the
/// key order is the insertion order.
pub fn user_id(i: usize) -> String {
    format!("user-{:04}", i)
}

/// A store with one user per age cell, in the given order.
pub fn store_with_cells(ages: Vec<Cell>) -> MemoryStore {
    let store = MemoryStore::user_data();
    for (i, age) in ages.into_iter().enumerate() {
        let name = format!("User {}", i);
        let email = format!("user{}@example.com", i);
        store.insert(user_tuple(&user_id(i), &name, &email, age)).unwrap();
    }
    store
}

/// A store with integral `DECIMAL` ages.
pub fn store_with_ages(ages: &[i64]) -> MemoryStore {
    store_with_cells(
        ages.iter()
            .map(|age| Cell::Decimal(Decimal::new(age * 100, 2).unwrap()))
            .collect(),
    )
}

/// A store with `rows` users of random ages in `[18, 100)`, two decimal
/// places. Returns the ages as stored, in key order.
pub fn new_random_store(rows: usize) -> (MemoryStore, Vec<f64>) {
    let mut rng = rand::thread_rng();
    let mut cells = Vec::with_capacity(rows);
    let mut ages = Vec::with_capacity(rows);
    for _ in 0..rows {
        let age = Decimal::new(rng.gen_range(1800, 10000), 2).unwrap();
        ages.push(age.to_f64());
        cells.push(Cell::Decimal(age));
    }

    debug!("random store constructed, {} rows", rows);
    (store_with_cells(cells), ages)
}

/// A writer collecting everything written to it; clones share the buffer.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A writer that accepts `capacity` lines and then reports a broken pipe,
/// like stdout piped into `head`.
pub struct ClosingPipe {
    capacity: usize,
    pub lines: Vec<String>,
    partial: Vec<u8>,
}

impl ClosingPipe {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: Vec::new(),
            partial: Vec::new(),
        }
    }
}

impl Write for ClosingPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.lines.len() >= self.capacity {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        }
        for b in buf {
            if *b == b'\n' {
                let line = String::from_utf8_lossy(&self.partial).to_string();
                self.lines.push(line);
                self.partial.clear();
            } else {
                self.partial.push(*b);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
