use env_logger::{Builder, Env};
use std::io::Write;

const DEFAULT_FILTER: &str = "warn";

/// Configure `env_logger` from `RUST_LOG`, `warn` when it is unset. Logs go
/// to stderr, stdout is left to the row output. Later calls are ignored.
pub fn init_log() {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    let _ = builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}:{}] {}",
                record.level(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}
