mod number;
mod other;

pub use number::{ceil_div, Number};
pub use other::HandyRwLock;

pub use crate::log::init_log;
