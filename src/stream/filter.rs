use std::{
    io::{self, Write},
    ops::ControlFlow,
};

use log::{debug, error};

use crate::{record::User, types::StreamResult};

/// Numeric user field a filter can compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Age,
}

impl NumericField {
    pub fn value(&self, user: &User) -> f64 {
        match self {
            NumericField::Age => user.age.as_f64(),
        }
    }
}

/// Outcome of `for_each_above_threshold`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Filtered {
    pub scanned: usize,
    pub matched: usize,

    /// The action asked to stop before the source was drained.
    pub stopped_early: bool,
}

/// Call `action` for every user whose `field` is strictly greater than
/// `threshold`, in arrival order. Matches are not collected.
///
/// The action returns `ControlFlow::Break` when its output has gone away
/// (e.g. a closed pipe). That ends the loop normally: the source is dropped,
/// which releases its connection, and `Ok` is returned.
pub fn for_each_above_threshold<I, F>(
    source: I,
    field: NumericField,
    threshold: f64,
    mut action: F,
) -> StreamResult<Filtered>
where
    I: IntoIterator<Item = StreamResult<User>>,
    F: FnMut(&User) -> ControlFlow<()>,
{
    let mut filtered = Filtered::default();

    for user in source {
        let user = user?;
        filtered.scanned += 1;

        if field.value(&user) > threshold {
            filtered.matched += 1;
            if let ControlFlow::Break(()) = action(&user) {
                debug!("consumer stopped after {} matches", filtered.matched);
                filtered.stopped_early = true;
                break;
            }
        }
    }

    Ok(filtered)
}

/// An action writing each user as one JSON line.
///
/// A broken pipe stops the loop quietly; any other write error is logged
/// and stops it as well.
pub fn write_line_sink<W: Write>(mut writer: W) -> impl FnMut(&User) -> ControlFlow<()> {
    move |user| match write_line(&mut writer, user) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ControlFlow::Break(()),
        Err(e) => {
            error!("write failed: {}", e);
            ControlFlow::Break(())
        }
    }
}

fn write_line<W: Write>(writer: &mut W, user: &User) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, user)?;
    writeln!(writer)?;
    writer.flush()
}
