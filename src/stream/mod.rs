//! Memory-bounded streaming over a row store.
//!
//! Every layer is a pull-based iterator over the layer below it:
//!
//! ```text
//! PageFetcher -> Pages -> Rows / DirectRows -> consumer
//!                                              (filter, average_age)
//! ```
//!
//! No layer keeps more than one page of rows alive.

mod aggregate;
mod fetcher;
mod filter;
mod pager;
mod rows;

pub use aggregate::{average, average_age, stream_ages, AverageAge, RunningAggregate};
pub use fetcher::PageFetcher;
pub use filter::{for_each_above_threshold, write_line_sink, Filtered, NumericField};
pub use pager::{keyset_pages, pages, Pages};
pub use rows::{rows, rows_direct, DirectRows, Rows, ShapePolicy};

use crate::storage::{Cell, ScanQuery, Tuple};

/// Resumable position of a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Cursor {
    /// `LIMIT/OFFSET` pagination: number of rows already consumed.
    Offset(usize),

    /// Keyset pagination: the last key seen, `None` before the first page.
    After(Option<Cell>),
}

impl Cursor {
    pub(crate) fn query(&self, page_size: usize) -> ScanQuery {
        match self {
            Cursor::Offset(offset) => ScanQuery::range(page_size, *offset),
            Cursor::After(key) => ScanQuery::after(key.as_ref(), page_size),
        }
    }

    /// Move past `page`. Never moves backwards.
    pub(crate) fn advance(&mut self, page: &Page, key_pos: usize) {
        match self {
            Cursor::Offset(offset) => *offset += page.len(),
            Cursor::After(key) => {
                if let Some(last) = page.tuples().last().and_then(|t| t.get_cell(key_pos)) {
                    *key = Some(last.clone());
                }
            }
        }
    }
}

/// One bounded batch of rows, ordered by key, and the cursor it was fetched
/// at.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    tuples: Vec<Tuple>,
    cursor: Cursor,
}

impl Page {
    pub fn new(tuples: Vec<Tuple>, cursor: Cursor) -> Self {
        Self { tuples, cursor }
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn into_tuples(self) -> Vec<Tuple> {
        self.tuples
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// An empty page marks the end of the data set.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
