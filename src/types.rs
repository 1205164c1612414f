use std::sync::{Arc, RwLock};

use crate::error::StreamError;

pub type Pod<T> = Arc<RwLock<T>>;
pub type StreamResult<T = ()> = Result<T, StreamError>;
