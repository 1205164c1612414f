use std::iter::FusedIterator;

use log::{error, info};

use super::{Cursor, Page, PageFetcher};
use crate::{
    error::StreamError,
    storage::{RowStore, Schema},
    types::StreamResult,
};

/// Lazy `LIMIT/OFFSET` pagination: a page is fetched only when the consumer
/// asks for it. Every call starts a new cursor at the first row.
pub fn pages(store: &dyn RowStore, page_size: usize) -> Pages<'_> {
    Pages::new(PageFetcher::new(store), page_size, Cursor::Offset(0))
}

/// Lazy keyset pagination: each page starts right after the last key of
/// the previous one.
pub fn keyset_pages(store: &dyn RowStore, page_size: usize) -> Pages<'_> {
    Pages::new(PageFetcher::new(store), page_size, Cursor::After(None))
}

/// Sequence of pages produced on demand.
///
/// Ends at the first empty page. A fetch error is yielded once and ends the
/// sequence as well.
pub struct Pages<'s> {
    fetcher: PageFetcher<'s>,
    page_size: usize,
    cursor: Cursor,
    key_pos: usize,
    done: bool,
    fetches: usize,
}

impl<'s> Pages<'s> {
    fn new(fetcher: PageFetcher<'s>, page_size: usize, cursor: Cursor) -> Self {
        let key_pos = fetcher.schema().get_key_pos().unwrap_or(0);
        Self {
            fetcher,
            page_size,
            cursor,
            key_pos,
            done: false,
            fetches: 0,
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Number of fetch calls issued so far, the terminating one included.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn schema(&self) -> &Schema {
        self.fetcher.schema()
    }

    fn fail(&mut self, e: StreamError) -> Option<StreamResult<Page>> {
        error!("pagination stopped at {:?}: {}", self.cursor, e);
        self.done = true;
        Some(Err(e))
    }
}

impl Iterator for Pages<'_> {
    type Item = StreamResult<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.fetches += 1;
        match self.fetcher.fetch_at(self.page_size, &self.cursor) {
            Ok(page) if page.is_empty() => {
                info!(
                    "pagination finished at {:?} after {} fetches",
                    self.cursor, self.fetches
                );
                self.done = true;
                None
            }
            Ok(page) => {
                self.cursor.advance(&page, self.key_pos);
                Some(Ok(page))
            }
            Err(e) => self.fail(e),
        }
    }
}

impl FusedIterator for Pages<'_> {}
