use log::debug;

use super::{Cursor, Page};
use crate::{
    error::StreamError,
    storage::{Cell, RowStore, Schema, Session},
    types::StreamResult,
};

/// Issues one bounded range query per call.
///
/// Each call opens its own connection and closes it before returning, on
/// success and on error alike. Failures are returned as they are; retrying
/// is up to the caller.
pub struct PageFetcher<'s> {
    store: &'s dyn RowStore,
}

impl<'s> PageFetcher<'s> {
    pub fn new(store: &'s dyn RowStore) -> Self {
        Self { store }
    }

    pub fn schema(&self) -> &Schema {
        self.store.schema()
    }

    /// At most `page_size` rows ordered by key, starting at row `offset`.
    /// The page is empty once `offset` reaches the end of the table.
    pub fn fetch(&self, page_size: usize, offset: usize) -> StreamResult<Page> {
        self.fetch_at(page_size, &Cursor::Offset(offset))
    }

    /// At most `page_size` rows with a key strictly greater than
    /// `last_key`; from the first row when `last_key` is `None`.
    pub fn fetch_after(&self, page_size: usize, last_key: Option<&Cell>) -> StreamResult<Page> {
        self.fetch_at(page_size, &Cursor::After(last_key.cloned()))
    }

    pub fn fetch_at(&self, page_size: usize, cursor: &Cursor) -> StreamResult<Page> {
        if page_size == 0 {
            return Err(StreamError::query("page size must be positive"));
        }

        let query = cursor.query(page_size);
        let mut session = Session::open(self.store)?;
        session.execute(&query)?;
        let tuples = session.fetch_many(page_size)?;

        debug!("fetched {} rows at {:?}", tuples.len(), cursor);
        Ok(Page::new(tuples, cursor.clone()))
    }
}
