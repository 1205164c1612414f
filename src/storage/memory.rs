use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use log::{debug, error};

use super::{
    schema::Schema,
    store::{Connection, RowStore, ScanQuery},
    tuple::{Cell, Tuple},
};
use crate::{error::StreamError, types::Pod, types::StreamResult, utils::HandyRwLock};

const NEVER_FAIL: usize = usize::MAX;

/// Connection and query counters of a `MemoryStore`.
#[derive(Debug, Default)]
pub struct StoreStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    queries: AtomicUsize,
}

impl StoreStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Connections opened but not closed yet. Zero when a reset happened
    /// while connections were open and they closed afterwards.
    pub fn open_connections(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }

    /// Number of queries executed successfully.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.opened.store(0, Ordering::SeqCst);
        self.closed.store(0, Ordering::SeqCst);
        self.queries.store(0, Ordering::SeqCst);
    }
}

/// An ordered, in-process row store.
///
/// Rows are kept sorted by the key field. The store can be switched to
/// "unreachable", or told to fail after a number of queries, to exercise the
/// connectivity paths of its callers.
pub struct MemoryStore {
    schema: Schema,
    key_pos: usize,
    rows: Pod<BTreeMap<Cell, Tuple>>,
    reachable: Arc<AtomicBool>,
    // queries left before the store starts failing
    fail_after: Arc<AtomicUsize>,
    stats: Arc<StoreStats>,
}

// constructors
impl MemoryStore {
    pub fn new(schema: Schema) -> StreamResult<Self> {
        let key_pos = schema
            .get_key_pos()
            .ok_or_else(|| StreamError::query("schema has no primary key"))?;
        Ok(Self::with_key(schema, key_pos))
    }

    /// An empty `user_data` table.
    pub fn user_data() -> Self {
        Self::with_key(Schema::user_data(), 0)
    }

    fn with_key(schema: Schema, key_pos: usize) -> Self {
        Self {
            schema,
            key_pos,
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            reachable: Arc::new(AtomicBool::new(true)),
            fail_after: Arc::new(AtomicUsize::new(NEVER_FAIL)),
            stats: Arc::new(StoreStats::default()),
        }
    }
}

impl MemoryStore {
    /// Insert a row, replacing the row with the same key if there is one
    /// (upsert). Returns the replaced row.
    ///
    /// Only the width and the key are checked: like a driver, the store
    /// hands out whatever values it was given.
    pub fn insert(&self, tuple: Tuple) -> StreamResult<Option<Tuple>> {
        if tuple.width() != self.schema.width() {
            return Err(StreamError::query(&format!(
                "row has {} cells, table has {} columns",
                tuple.width(),
                self.schema.width()
            )));
        }

        let key = match tuple.get_cell(self.key_pos) {
            Some(key) if !key.is_null() => key.clone(),
            _ => return Err(StreamError::query("row has a null key")),
        };

        Ok(self.rows.wl().insert(key, tuple))
    }

    pub fn len(&self) -> usize {
        self.rows.rl().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Let the next `queries` queries succeed, then fail every following
    /// one with a connectivity error.
    pub fn fail_after(&self, queries: usize) {
        self.fail_after.store(queries, Ordering::SeqCst);
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }
}

impl RowStore for MemoryStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn connect(&self) -> StreamResult<Box<dyn Connection>> {
        if !self.reachable.load(Ordering::SeqCst) {
            error!("connect failed, store is unreachable");
            return Err(StreamError::connectivity("store is unreachable"));
        }

        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            rows: Arc::clone(&self.rows),
            reachable: Arc::clone(&self.reachable),
            fail_after: Arc::clone(&self.fail_after),
            stats: Arc::clone(&self.stats),
            result: None,
            closed: false,
        }))
    }
}

/// Position of an active result set.
///
/// Only the last visited key is kept, the rows themselves stay in the store
/// until they are fetched.
struct ResultSet {
    query: ScanQuery,
    last_key: Option<Cell>,
    to_skip: usize,
    returned: usize,
    drained: bool,
}

impl ResultSet {
    fn new(query: &ScanQuery) -> Self {
        Self {
            query: query.clone(),
            last_key: query.after.clone(),
            to_skip: query.offset,
            returned: 0,
            drained: false,
        }
    }

    fn next(&mut self, rows: &BTreeMap<Cell, Tuple>) -> Option<Tuple> {
        if self.drained {
            return None;
        }
        if let Some(limit) = self.query.limit {
            if self.returned >= limit {
                self.drained = true;
                return None;
            }
        }

        let lower = match &self.last_key {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };
        for (key, tuple) in rows.range::<Cell, _>((lower, Bound::Unbounded)) {
            self.last_key = Some(key.clone());

            if !self.query.matches(tuple) {
                continue;
            }
            if self.to_skip > 0 {
                self.to_skip -= 1;
                continue;
            }

            self.returned += 1;
            return Some(tuple.clone());
        }

        self.drained = true;
        None
    }
}

struct MemoryConnection {
    rows: Pod<BTreeMap<Cell, Tuple>>,
    reachable: Arc<AtomicBool>,
    fail_after: Arc<AtomicUsize>,
    stats: Arc<StoreStats>,
    result: Option<ResultSet>,
    closed: bool,
}

impl MemoryConnection {
    fn check(&self) -> StreamResult {
        if self.closed {
            return Err(StreamError::connectivity("connection is closed"));
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(StreamError::connectivity("store is unreachable"));
        }
        Ok(())
    }

    // consume one unit of the failure budget, false once it is used up
    fn take_query_budget(&self) -> bool {
        self.fail_after
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                NEVER_FAIL => Some(NEVER_FAIL),
                left => Some(left - 1),
            })
            .is_ok()
    }
}

impl Connection for MemoryConnection {
    fn execute(&mut self, query: &ScanQuery) -> StreamResult {
        self.check()?;
        if query.limit == Some(0) {
            return Err(StreamError::query("LIMIT must be positive"));
        }
        if !self.take_query_budget() {
            return Err(StreamError::connectivity("lost connection during query"));
        }

        debug!("execute: {}", query);
        self.stats.queries.fetch_add(1, Ordering::SeqCst);
        self.result = Some(ResultSet::new(query));
        Ok(())
    }

    fn fetch_one(&mut self) -> StreamResult<Option<Tuple>> {
        self.check()?;
        let rows = self.rows.rl();
        match self.result.as_mut() {
            Some(result) => Ok(result.next(&rows)),
            None => Err(StreamError::query("no active result set")),
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.result = None;
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}
