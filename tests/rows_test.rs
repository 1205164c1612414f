mod test_utils;

use cursor_stream::{
    pages, rows, rows_direct,
    storage::{
        seed::user_tuple,
        tuple::{Cell, Decimal},
        RowStore,
    },
    stream_users,
    utils::ceil_div,
    Age, ErrorKind, MemoryStore, ShapePolicy, StreamResult, User, UserLayout,
};
use test_utils::{new_random_store, setup, store_with_ages, store_with_cells, user_id};

fn ids(users: &[User]) -> Vec<String> {
    users.iter().map(|u| u.user_id.clone()).collect()
}

#[test]
fn test_order_matches_full_scan() {
    setup();

    for n in [0, 1, 7, 64].iter() {
        let (store, ages) = new_random_store(*n);
        let expected: Vec<String> = (0..*n).map(user_id).collect();

        for page_size in [1, 2, 5, 100].iter() {
            let paged: Vec<User> = stream_users(&store, *page_size, ShapePolicy::Skip)
                .unwrap()
                .collect::<StreamResult<_>>()
                .unwrap();
            assert_eq!(ids(&paged), expected);

            let paged_ages: Vec<f64> = paged.iter().map(|u| u.age.as_f64()).collect();
            assert_eq!(paged_ages, ages);

            let batched: Vec<User> = rows_direct(&store, *page_size, ShapePolicy::Skip)
                .unwrap()
                .collect::<StreamResult<_>>()
                .unwrap();
            assert_eq!(batched, paged);
        }

        let direct: Vec<User> = rows_direct(&store, 1, ShapePolicy::Skip)
            .unwrap()
            .collect::<StreamResult<_>>()
            .unwrap();
        assert_eq!(ids(&direct), expected);
    }
}

#[test]
fn test_bounded_residency() {
    setup();

    let (store, _) = new_random_store(95);
    let page_size = 10;

    let layout = UserLayout::of(store.schema()).unwrap();
    let mut it = rows(pages(&store, page_size), layout, ShapePolicy::Skip);
    let count = it.by_ref().map(|u| u.unwrap()).count();

    assert_eq!(count, 95);
    assert_eq!(it.delivered(), 95);
    assert!(it.peak_resident() <= page_size);

    // ten pages and the empty fetch that ends the scan
    assert_eq!(store.stats().queries(), ceil_div(95, page_size) + 1);
}

#[test]
fn test_lazy_fetching() {
    setup();

    let (store, _) = new_random_store(30);
    let layout = UserLayout::of(store.schema()).unwrap();
    let mut it = rows(pages(&store, 10), layout, ShapePolicy::Skip);

    assert_eq!(store.stats().queries(), 0);
    for _ in 0..10 {
        it.next().unwrap().unwrap();
    }
    assert_eq!(store.stats().queries(), 1);
    it.next().unwrap().unwrap();
    assert_eq!(store.stats().queries(), 2);
}

#[test]
fn test_age_normalization() {
    setup();

    let store = store_with_cells(vec![
        Cell::Decimal(Decimal::new(3000, 2).unwrap()),
        Cell::Decimal(Decimal::new(3050, 2).unwrap()),
        Cell::Int64(41),
        Cell::Float64(19.25),
    ]);
    let ages: Vec<Age> = stream_users(&store, 2, ShapePolicy::Abort)
        .unwrap()
        .map(|u| u.unwrap().age)
        .collect();

    assert_eq!(
        ages,
        vec![Age::Int(30), Age::Frac(30.5), Age::Int(41), Age::Frac(19.25)]
    );
}

#[test]
fn test_json_shape() {
    setup();

    let store = store_with_cells(vec![
        Cell::Decimal(Decimal::new(4500, 2).unwrap()),
        Cell::Decimal(Decimal::new(4550, 2).unwrap()),
    ]);
    let users: Vec<User> = stream_users(&store, 10, ShapePolicy::Abort)
        .unwrap()
        .collect::<StreamResult<_>>()
        .unwrap();

    let first = serde_json::to_value(&users[0]).unwrap();
    assert_eq!(first["user_id"], "user-0000");
    assert_eq!(first["age"], serde_json::json!(45));

    let second = serde_json::to_value(&users[1]).unwrap();
    assert_eq!(second["age"], serde_json::json!(45.5));
}

fn store_with_bad_row() -> MemoryStore {
    let store = store_with_ages(&[20, 30, 40]);
    // text where the age should be
    store
        .insert(user_tuple(
            &user_id(1),
            "Broken",
            "broken@example.com",
            Cell::String("thirty".to_string()),
        ))
        .unwrap();
    store
}

#[test]
fn test_skip_bad_rows() {
    setup();

    let store = store_with_bad_row();
    let layout = UserLayout::of(store.schema()).unwrap();
    let mut it = rows(pages(&store, 2), layout, ShapePolicy::Skip);
    let users: Vec<User> = it.by_ref().collect::<StreamResult<_>>().unwrap();

    assert_eq!(ids(&users), vec![user_id(0), user_id(2)]);
    assert_eq!(it.skipped(), 1);

    let mut direct = rows_direct(&store, 1, ShapePolicy::Skip).unwrap();
    let users: Vec<User> = direct.by_ref().collect::<StreamResult<_>>().unwrap();
    assert_eq!(ids(&users), vec![user_id(0), user_id(2)]);
    assert_eq!(direct.skipped(), 1);
}

#[test]
fn test_abort_on_bad_row() {
    setup();

    let store = store_with_bad_row();
    let mut it = stream_users(&store, 2, ShapePolicy::Abort).unwrap();
    assert_eq!(it.next().unwrap().unwrap().user_id, user_id(0));
    assert_eq!(
        it.next().unwrap().unwrap_err().kind(),
        ErrorKind::DataShape
    );
    assert!(it.next().is_none());

    let mut direct = rows_direct(&store, 1, ShapePolicy::Abort).unwrap();
    direct.next().unwrap().unwrap();
    assert_eq!(
        direct.next().unwrap().unwrap_err().kind(),
        ErrorKind::DataShape
    );
    assert!(direct.next().is_none());
    assert_eq!(store.stats().open_connections(), 0);
}

#[test]
fn test_abandoned_stream_releases_connection() {
    setup();

    let (store, _) = new_random_store(50);

    // direct mode holds one connection for the whole scan
    {
        let mut it = rows_direct(&store, 1, ShapePolicy::Skip).unwrap();
        for _ in 0..7 {
            it.next().unwrap().unwrap();
        }
        assert_eq!(store.stats().open_connections(), 1);
    }
    assert_eq!(store.stats().opened(), 1);
    assert_eq!(store.stats().closed(), 1);

    // paged mode never holds a connection between pages
    store.stats().reset();
    {
        let mut it = stream_users(&store, 10, ShapePolicy::Skip).unwrap();
        for _ in 0..13 {
            it.next().unwrap().unwrap();
        }
        assert_eq!(store.stats().open_connections(), 0);
    }
    assert_eq!(store.stats().opened(), 2);
    assert_eq!(store.stats().closed(), 2);
}

#[test]
fn test_drained_stream_releases_connection() {
    setup();

    let (store, _) = new_random_store(5);
    let mut it = rows_direct(&store, 2, ShapePolicy::Skip).unwrap();
    assert_eq!(it.by_ref().count(), 5);

    // released at the end of the scan, not only on drop
    assert_eq!(store.stats().closed(), 1);
    assert!(it.next().is_none());
    drop(it);
    assert_eq!(store.stats().closed(), 1);
}

#[test]
fn test_direct_errors() {
    setup();

    let store = store_with_ages(&[20]);
    match rows_direct(&store, 0, ShapePolicy::Skip) {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Query),
        Ok(_) => panic!("batch size 0 accepted"),
    }

    store.set_reachable(false);
    match rows_direct(&store, 1, ShapePolicy::Skip) {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Connectivity),
        Ok(_) => panic!("unreachable store accepted"),
    }
}

#[test]
fn test_connection_lost_mid_stream() {
    setup();

    let store = store_with_ages(&[20, 30, 40, 50]);
    let mut it = rows_direct(&store, 1, ShapePolicy::Skip).unwrap();
    it.next().unwrap().unwrap();

    store.set_reachable(false);
    assert_eq!(
        it.next().unwrap().unwrap_err().kind(),
        ErrorKind::Connectivity
    );
    assert!(it.next().is_none());
    assert_eq!(store.stats().closed(), 1);
}
