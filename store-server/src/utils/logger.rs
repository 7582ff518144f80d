//! Logging
//!
//! tracing subscriber setup: env-filtered stdout by default, optional
//! daily-rolling file output for deployed nodes.

use std::path::Path;

/// Stdout logging at the default level
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Logging with optional file output.
///
/// Falls back to stdout when `log_dir` is missing or does not exist;
/// `RUST_LOG` overrides the level passed in.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "store-server");
            let _ = subscriber.with_writer(file_appender).try_init();
            return;
        }
    }

    // repeated init (tests) must not panic
    let _ = subscriber.try_init();
}
