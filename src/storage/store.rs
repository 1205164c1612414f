use std::{fmt, ops::Deref, ops::DerefMut};

use log::debug;

use super::{
    predicate::Predicate,
    schema::Schema,
    tuple::{Cell, Tuple},
};
use crate::types::StreamResult;

/// A scan over the whole table, ordered by the key field ascending.
///
/// The window is either offset based (`LIMIT/OFFSET`) or key based (rows
/// strictly after `after`).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ScanQuery {
    pub predicate: Option<Predicate>,
    pub after: Option<Cell>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ScanQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn range(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
            ..Self::default()
        }
    }

    pub fn after(last_key: Option<&Cell>, limit: usize) -> Self {
        Self {
            after: last_key.cloned(),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        match &self.predicate {
            Some(predicate) => predicate.matches(tuple),
            None => true,
        }
    }
}

/// Renders the query as the SQL a driver would send, which also makes it a
/// stable cache key.
impl fmt::Display for ScanQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SELECT * FROM user_data")?;

        let mut conditions = Vec::new();
        if let Some(key) = &self.after {
            conditions.push(format!("key > {}", key));
        }
        if let Some(predicate) = &self.predicate {
            conditions.push(predicate.to_string());
        }
        if !conditions.is_empty() {
            write!(f, " WHERE {}", conditions.join(" AND "))?;
        }

        write!(f, " ORDER BY key")?;
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        Ok(())
    }
}

/// One open connection to a row store, with at most one active result set.
pub trait Connection: Send {
    /// Run `query`, replacing the previous result set.
    fn execute(&mut self, query: &ScanQuery) -> StreamResult;

    /// Next row of the active result set, `None` once it is drained.
    fn fetch_one(&mut self) -> StreamResult<Option<Tuple>>;

    /// Up to `n` rows of the active result set; empty once it is drained.
    fn fetch_many(&mut self, n: usize) -> StreamResult<Vec<Tuple>> {
        let mut rows = Vec::with_capacity(n);
        while rows.len() < n {
            match self.fetch_one()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    fn fetch_all(&mut self) -> StreamResult<Vec<Tuple>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one()? {
            rows.push(row);
        }
        Ok(rows)
    }

    fn close(&mut self);
}

pub trait RowStore: Send + Sync {
    fn schema(&self) -> &Schema;

    fn connect(&self) -> StreamResult<Box<dyn Connection>>;
}

/// Scoped ownership of a connection.
///
/// The connection is closed exactly once, when the session is dropped,
/// whichever way the owner exits.
pub struct Session {
    conn: Box<dyn Connection>,
}

impl Session {
    pub fn open(store: &dyn RowStore) -> StreamResult<Self> {
        let conn = store.connect()?;
        debug!("session opened");
        Ok(Self { conn })
    }
}

impl Deref for Session {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        &*self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.conn.close();
        debug!("session closed");
    }
}
