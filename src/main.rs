use std::{
    io::{self, Write},
    process,
};

use cursor_stream::{
    average_age,
    config::Config,
    for_each_above_threshold, rows_direct,
    storage::seed,
    stream::{write_line_sink, NumericField},
    stream_users,
    utils::init_log,
    MemoryStore, StreamResult,
};
use log::{error, info};

const GENERATED_USERS: usize = 100;

/// Print the users older than `STREAM_THRESHOLD` as JSON lines, then the
/// average age of all users.
///
/// `cursor-stream | head -n 3` is fine: a closed stdout ends the output
/// quietly.
pub fn main() {
    init_log();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}

fn run() -> StreamResult {
    let config = Config::from_env()?;
    info!("config: {:?}", config);

    let store = MemoryStore::user_data();
    match &config.seed_csv {
        Some(path) => seed::load_csv(&store, path)?,
        None => seed::generate(&store, GENERATED_USERS, &mut rand::thread_rng())?,
    };

    let stdout = io::stdout();
    let users = stream_users(&store, config.page_size, config.shape_policy)?;
    let filtered = for_each_above_threshold(
        users,
        NumericField::Age,
        config.threshold,
        write_line_sink(stdout.lock()),
    )?;
    info!("{:?}", filtered);
    if filtered.stopped_early {
        return Ok(());
    }

    let average = average_age(rows_direct(&store, 1, config.shape_policy)?)?;
    let line = match average {
        Some(avg) => format!("Average age of users: {}", avg),
        None => "Average age of users: no data".to_string(),
    };

    let mut out = stdout.lock();
    match writeln!(out, "{}", line) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e.into()),
        _ => Ok(()),
    }
}
