pub mod cache;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod record;
pub mod retry;
pub mod storage;
pub mod stream;
pub mod types;
pub mod utils;

mod log;

pub use error::{ErrorKind, StreamError};
pub use record::{Age, User, UserLayout};
pub use storage::{MemoryStore, RowStore};
pub use stream::{
    average_age, for_each_above_threshold, keyset_pages, pages, rows, rows_direct, Page,
    ShapePolicy,
};
pub use types::StreamResult;

/// Stream every user of `store`, `page_size` rows per fetch.
pub fn stream_users(
    store: &dyn RowStore,
    page_size: usize,
    policy: ShapePolicy,
) -> StreamResult<stream::Rows<stream::Pages<'_>>> {
    let layout = UserLayout::of(store.schema())?;
    Ok(rows(pages(store, page_size), layout, policy))
}
