use std::num::NonZeroUsize;

use log::debug;
use lru::LruCache;

use crate::{
    error::StreamError,
    storage::{RowStore, ScanQuery, Session, Tuple},
    types::StreamResult,
};

/// A capacity-bounded query cache, keyed by the query text.
///
/// The least recently used entry is evicted when a new entry would exceed
/// the capacity. The cache is owned by its caller; nothing is shared
/// between caches.
pub struct QueryCache<V> {
    entries: LruCache<String, V>,
    hits: usize,
    misses: usize,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(capacity: usize) -> StreamResult<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| StreamError::query("cache capacity must be positive"))?;

        Ok(Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        })
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or replace an entry. Returns the key evicted to make room, if
    /// any.
    pub fn insert(&mut self, key: String, value: V) -> Option<String> {
        // replacing an entry hands back the old pair, not an eviction
        let replaced = self.entries.contains(&key);
        match self.entries.push(key, value) {
            Some((evicted, _)) if !replaced => {
                debug!("evicted: {}", evicted);
                Some(evicted)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Run `query` to completion, or answer it from `cache` if the same query
/// text was seen before.
pub fn cached_query(
    store: &dyn RowStore,
    cache: &mut QueryCache<Vec<Tuple>>,
    query: &ScanQuery,
) -> StreamResult<Vec<Tuple>> {
    let key = query.to_string();
    if let Some(rows) = cache.get(&key) {
        debug!("cache hit: {}", key);
        return Ok(rows);
    }

    debug!("cache miss: {}", key);
    let mut session = Session::open(store)?;
    session.execute(query)?;
    let rows = session.fetch_all()?;
    cache.insert(key, rows.clone());
    Ok(rows)
}
