mod test_utils;

use std::sync::Arc;

use cursor_stream::{
    average_age,
    concurrent::fetch_concurrently,
    keyset_pages,
    storage::RowStore,
    stream_users,
    utils::HandyRwLock,
    ErrorKind, ShapePolicy, StreamResult, User,
};
use test_utils::{new_random_store, setup, store_with_ages};

#[tokio::test]
async fn test_fetch_concurrently() {
    setup();

    let store: Arc<dyn RowStore> = Arc::new(store_with_ages(&[10, 26, 25, 40, 33]));
    let fetched = fetch_concurrently(Arc::clone(&store), 25.0, ShapePolicy::Skip)
        .await
        .unwrap();

    assert_eq!(fetched.all.len(), 5);
    let older: Vec<f64> = fetched.older.iter().map(|u| u.age.as_f64()).collect();
    assert_eq!(older, vec![26.0, 40.0, 33.0]);
}

#[tokio::test]
async fn test_fetch_concurrently_fails_as_a_whole() {
    setup();

    let store = store_with_ages(&[10, 20]);
    store.set_reachable(false);
    let store: Arc<dyn RowStore> = Arc::new(store);

    let result = fetch_concurrently(store, 15.0, ShapePolicy::Skip).await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Connectivity);
}

/// Several readers stream the same table at once, each on connections of
/// its own. Nobody sees another reader's cursor.
#[test]
fn test_parallel_readers() {
    setup();

    let (store, ages) = new_random_store(200);
    let expected: f64 = ages.iter().sum::<f64>() / ages.len() as f64;
    let results = std::sync::RwLock::new(Vec::new());

    crossbeam::scope(|s| {
        for page_size in 1..=8 {
            let store = &store;
            let results = &results;
            s.spawn(move |_| {
                let users: Vec<User> = stream_users(store, page_size, ShapePolicy::Skip)
                    .unwrap()
                    .collect::<StreamResult<_>>()
                    .unwrap();
                let avg = average_age(users.into_iter().map(Ok)).unwrap().unwrap();
                results.wl().push((page_size, avg.value()));
            });
        }
    })
    .unwrap();

    let results = results.rl();
    assert_eq!(results.len(), 8);
    for (page_size, avg) in results.iter() {
        assert!(
            (avg - expected).abs() < 1e-9,
            "page size {} gave {}",
            page_size,
            avg
        );
    }
    assert_eq!(store.stats().open_connections(), 0);
}

#[test]
fn test_readers_report_over_channel() {
    setup();

    let store = store_with_ages(&[20, 30, 40, 50, 60, 70, 80]);
    let (sender, receiver) = crossbeam::channel::unbounded();

    crossbeam::scope(|s| {
        for page_size in 1..=4 {
            let store = &store;
            let sender = sender.clone();
            s.spawn(move |_| {
                let pages = keyset_pages(store, page_size);
                let sizes: Vec<usize> = pages.map(|p| p.unwrap().len()).collect();
                sender.send((page_size, sizes)).unwrap();
            });
        }
    })
    .unwrap();
    drop(sender);

    let mut reports: Vec<(usize, Vec<usize>)> = receiver.iter().collect();
    reports.sort();
    assert_eq!(
        reports,
        vec![
            (1, vec![1; 7]),
            (2, vec![2, 2, 2, 1]),
            (3, vec![3, 3, 1]),
            (4, vec![4, 3]),
        ]
    );
}
