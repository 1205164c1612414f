use cursor_stream::utils::init_log;

/// # Conduct the initialization
///
/// - Setting up log configurations.
///
/// Stores are created per test, there is no global state to reset.
pub fn setup() {
    init_log();
}
