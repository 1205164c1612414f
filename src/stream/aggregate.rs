use std::fmt;

use log::debug;

use super::{rows_direct, ShapePolicy};
use crate::{record::User, storage::RowStore, types::StreamResult};

/// Running `(sum, count)` of a numeric stream.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningAggregate {
    sum: f64,
    count: u64,
}

impl RunningAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// `None` when nothing has been pushed.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

/// An unrounded mean age. Rounding to two decimals happens only when it is
/// displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageAge(f64);

impl AverageAge {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// The value as displayed, rounded to two decimals. Ties follow the
    /// formatter, so `20.125` gives `20.12`.
    pub fn rounded(&self) -> f64 {
        self.to_string().parse().unwrap_or(self.0)
    }
}

impl fmt::Display for AverageAge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Mean age of a user stream, holding only a running sum and count.
///
/// `Ok(None)` means the stream was empty, which is not the same as an
/// average of zero. The first error of the stream is returned as is.
pub fn average_age<I>(source: I) -> StreamResult<Option<AverageAge>>
where
    I: IntoIterator<Item = StreamResult<User>>,
{
    let mut aggregate = RunningAggregate::new();
    for user in source {
        aggregate.push(user?.age.as_f64());
    }

    debug!("average over {} users", aggregate.count());
    Ok(aggregate.mean().map(AverageAge))
}

/// Mean of plain values, `None` for an empty input.
pub fn average<I>(values: I) -> Option<AverageAge>
where
    I: IntoIterator<Item = f64>,
{
    let mut aggregate = RunningAggregate::new();
    values.into_iter().for_each(|v| aggregate.push(v));
    aggregate.mean().map(AverageAge)
}

/// Ages of all users, one row at a time from a live connection.
pub fn stream_ages(
    store: &dyn RowStore,
    policy: ShapePolicy,
) -> StreamResult<impl Iterator<Item = StreamResult<f64>>> {
    let users = rows_direct(store, 1, policy)?;
    Ok(users.map(|user| user.map(|u| u.age.as_f64())))
}
