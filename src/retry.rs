use std::{thread, time::Duration};

use log::warn;

use crate::{
    error::{ErrorKind, StreamError},
    types::StreamResult,
};

/// Caller-side retry of connectivity failures.
///
/// Nothing inside the streaming layers retries on its own; wrap a whole
/// operation (a page fetch, a full aggregation) in `RetryPolicy::run`
/// instead. Other error kinds are returned at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    attempts: usize,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, delay: Duration) -> StreamResult<Self> {
        if attempts == 0 {
            return Err(StreamError::query("retry attempts must be positive"));
        }
        Ok(Self { attempts, delay })
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn run<T, F>(&self, mut op: F) -> StreamResult<T>
    where
        F: FnMut() -> StreamResult<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if e.kind() == ErrorKind::Connectivity && attempt < self.attempts => {
                    warn!(
                        "attempt {} of {} failed: {}, retrying in {:?}",
                        attempt, self.attempts, e, self.delay
                    );
                    attempt += 1;
                    thread::sleep(self.delay);
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_until_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(0)).unwrap();
        let mut calls = 0;
        let result = policy.run(|| {
            calls += 1;
            if calls < 3 {
                Err(StreamError::connectivity("down"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_give_up() {
        let policy = RetryPolicy::new(2, Duration::from_millis(0)).unwrap();
        let mut calls = 0;
        let result: StreamResult<()> = policy.run(|| {
            calls += 1;
            Err(StreamError::connectivity("down"))
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Connectivity);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_query_error_is_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(0)).unwrap();
        let mut calls = 0;
        let result: StreamResult<()> = policy.run(|| {
            calls += 1;
            Err(StreamError::query("bad page size"))
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Query);
        assert_eq!(calls, 1);
    }
}
