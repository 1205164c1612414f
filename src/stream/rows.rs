use std::{iter::FusedIterator, str::FromStr, vec};

use log::{info, warn};

use super::Page;
use crate::{
    error::StreamError,
    record::{User, UserLayout},
    storage::{RowStore, ScanQuery, Session, Tuple},
    types::StreamResult,
};

/// What to do with a row that cannot be turned into a `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePolicy {
    /// Log the row and keep streaming.
    Skip,

    /// Yield the data shape error and end the stream.
    Abort,
}

impl Default for ShapePolicy {
    /// `Skip`, or `Abort` when built with the `shape_abort` feature.
    fn default() -> Self {
        if cfg!(feature = "shape_abort") {
            ShapePolicy::Abort
        } else {
            ShapePolicy::Skip
        }
    }
}

impl FromStr for ShapePolicy {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ShapePolicy::Skip),
            "abort" => Ok(ShapePolicy::Abort),
            other => Err(StreamError::query(&format!("unknown shape policy `{}`", other))),
        }
    }
}

// Ok(None) means the row was skipped.
fn decode_row(
    layout: &UserLayout,
    policy: ShapePolicy,
    tuple: &Tuple,
) -> StreamResult<Option<User>> {
    match layout.decode(tuple) {
        Ok(user) => Ok(Some(user)),
        Err(e) => match policy {
            ShapePolicy::Skip => {
                warn!("skip row: {}", e);
                Ok(None)
            }
            ShapePolicy::Abort => Err(e),
        },
    }
}

/// Flatten a sequence of pages into users, in page order.
///
/// The next page is pulled only once the current one is used up, so at
/// most one page of rows is alive at any time.
pub fn rows<I>(pages: I, layout: UserLayout, policy: ShapePolicy) -> Rows<I::IntoIter>
where
    I: IntoIterator<Item = StreamResult<Page>>,
{
    Rows {
        pages: pages.into_iter(),
        current: Vec::new().into_iter(),
        layout,
        policy,
        done: false,
        delivered: 0,
        skipped: 0,
        peak_resident: 0,
    }
}

pub struct Rows<I> {
    pages: I,
    current: vec::IntoIter<Tuple>,
    layout: UserLayout,
    policy: ShapePolicy,
    done: bool,
    delivered: usize,
    skipped: usize,
    peak_resident: usize,
}

impl<I> Rows<I> {
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The largest number of rows held at once so far.
    pub fn peak_resident(&self) -> usize {
        self.peak_resident
    }
}

impl<I> Iterator for Rows<I>
where
    I: Iterator<Item = StreamResult<Page>>,
{
    type Item = StreamResult<User>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(tuple) = self.current.next() {
                match decode_row(&self.layout, self.policy, &tuple) {
                    Ok(Some(user)) => {
                        self.delivered += 1;
                        return Some(Ok(user));
                    }
                    Ok(None) => self.skipped += 1,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
                continue;
            }

            match self.pages.next() {
                Some(Ok(page)) => {
                    self.peak_resident = self.peak_resident.max(page.len());
                    self.current = page.into_tuples().into_iter();
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    info!(
                        "rows finished, delivered: {}, skipped: {}",
                        self.delivered, self.skipped
                    );
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

impl<I> FusedIterator for Rows<I> where I: Iterator<Item = StreamResult<Page>> {}

/// Stream users straight from one live connection, `batch_size` rows per
/// round trip (`1` reads row by row).
///
/// Yields the same users in the same order as `rows` over `pages`. The
/// connection is held until the scan ends, fails, or the iterator is
/// dropped.
pub fn rows_direct(
    store: &dyn RowStore,
    batch_size: usize,
    policy: ShapePolicy,
) -> StreamResult<DirectRows> {
    if batch_size == 0 {
        return Err(StreamError::query("batch size must be positive"));
    }

    let layout = UserLayout::of(store.schema())?;
    let mut session = Session::open(store)?;
    session.execute(&ScanQuery::all())?;

    Ok(DirectRows {
        session: Some(session),
        batch: Vec::new().into_iter(),
        batch_size,
        layout,
        policy,
        delivered: 0,
        skipped: 0,
    })
}

pub struct DirectRows {
    session: Option<Session>,
    batch: vec::IntoIter<Tuple>,
    batch_size: usize,
    layout: UserLayout,
    policy: ShapePolicy,
    delivered: usize,
    skipped: usize,
}

impl DirectRows {
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn finish(&mut self) {
        self.batch = Vec::new().into_iter();
        if let Some(session) = self.session.take() {
            drop(session);
            info!(
                "direct scan finished, delivered: {}, skipped: {}",
                self.delivered, self.skipped
            );
        }
    }

    fn fetch_batch(&mut self) -> Option<StreamResult<Vec<Tuple>>> {
        let session = self.session.as_mut()?;
        let fetched = if self.batch_size == 1 {
            session.fetch_one().map(|row| row.into_iter().collect())
        } else {
            session.fetch_many(self.batch_size)
        };
        Some(fetched)
    }
}

impl Iterator for DirectRows {
    type Item = StreamResult<User>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tuple) = self.batch.next() {
                match decode_row(&self.layout, self.policy, &tuple) {
                    Ok(Some(user)) => {
                        self.delivered += 1;
                        return Some(Ok(user));
                    }
                    Ok(None) => self.skipped += 1,
                    Err(e) => {
                        self.finish();
                        return Some(Err(e));
                    }
                }
                continue;
            }

            match self.fetch_batch()? {
                Ok(tuples) if tuples.is_empty() => {
                    self.finish();
                    return None;
                }
                Ok(tuples) => self.batch = tuples.into_iter(),
                Err(e) => {
                    self.finish();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl FusedIterator for DirectRows {}
