use std::{error::Error, fmt, io};

use backtrace::Backtrace;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The row store cannot be reached.
    Connectivity,

    /// The request parameters are malformed (e.g. a zero page size).
    Query,

    /// A row is missing a required field, or carries a value of the wrong
    /// type.
    DataShape,

    Io,

    /// A background task died before it could report a result.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Connectivity => "connectivity error",
            ErrorKind::Query => "query error",
            ErrorKind::DataShape => "data shape error",
            ErrorKind::Io => "io error",
            ErrorKind::Internal => "internal error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub struct StreamError {
    kind: ErrorKind,
    details: String,
}

impl StreamError {
    pub fn new(kind: ErrorKind, msg: &str) -> StreamError {
        StreamError {
            kind,
            details: msg.to_string(),
        }
    }

    pub fn connectivity(msg: &str) -> StreamError {
        let bt = Backtrace::new();
        debug!("connectivity error: [{}], backtrace: {:?}", msg, bt);

        Self::new(ErrorKind::Connectivity, msg)
    }

    pub fn query(msg: &str) -> StreamError {
        Self::new(ErrorKind::Query, msg)
    }

    pub fn data_shape(msg: &str) -> StreamError {
        Self::new(ErrorKind::DataShape, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.details)
    }
}

impl Error for StreamError {}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        StreamError::new(ErrorKind::Io, &e.to_string())
    }
}
