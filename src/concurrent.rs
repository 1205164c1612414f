use std::sync::Arc;

use log::{info, warn};

use crate::{
    error::{ErrorKind, StreamError},
    record::{User, UserLayout},
    storage::{Cell, Op, Predicate, RowStore, ScanQuery, Session},
    stream::ShapePolicy,
    types::StreamResult,
};

/// Result of `fetch_concurrently`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrentFetch {
    pub all: Vec<User>,
    pub older: Vec<User>,
}

/// Run a query on its own connection and decode the rows.
pub fn fetch_users(
    store: &dyn RowStore,
    query: &ScanQuery,
    policy: ShapePolicy,
) -> StreamResult<Vec<User>> {
    let layout = UserLayout::of(store.schema())?;
    let mut session = Session::open(store)?;
    session.execute(query)?;

    let mut users = Vec::new();
    while let Some(tuple) = session.fetch_one()? {
        match layout.decode(&tuple) {
            Ok(user) => users.push(user),
            Err(e) if policy == ShapePolicy::Skip => warn!("skip row: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(users)
}

/// Fetch all users and the users older than `age_above` at the same time.
///
/// Each query runs on the blocking pool with a connection of its own; the
/// two results are only put together once both are complete. The first
/// failure is returned.
pub async fn fetch_concurrently(
    store: Arc<dyn RowStore>,
    age_above: f64,
    policy: ShapePolicy,
) -> StreamResult<ConcurrentFetch> {
    let age_pos = store
        .schema()
        .get_field_pos("age")
        .ok_or_else(|| StreamError::data_shape("table has no `age` column"))?;

    let all_query = ScanQuery::all();
    let older = Predicate::new(age_pos, Op::GreaterThan, &Cell::Float64(age_above));
    let older_query = ScanQuery::all().filter(older);

    let all_store = Arc::clone(&store);
    let all_task =
        tokio::task::spawn_blocking(move || fetch_users(&*all_store, &all_query, policy));
    let older_task =
        tokio::task::spawn_blocking(move || fetch_users(&*store, &older_query, policy));

    let (all, older) = tokio::try_join!(flatten(all_task), flatten(older_task))?;
    info!(
        "concurrent fetch done, all: {}, older than {}: {}",
        all.len(),
        age_above,
        older.len()
    );

    Ok(ConcurrentFetch { all, older })
}

async fn flatten<T>(task: tokio::task::JoinHandle<StreamResult<T>>) -> StreamResult<T> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(StreamError::new(
            ErrorKind::Internal,
            &format!("query task failed: {}", e),
        )),
    }
}
