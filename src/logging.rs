use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tidy_up::config::home_dir;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Pretty stdout layer plus a non-blocking plain-text file layer. The filter
/// comes from `TIDY_UP_LOG` (default `info`); the log file lands in the user
/// state directory unless `TIDY_UP_LOG_FILE` points elsewhere. The returned
/// guard flushes the file writer on drop.
pub fn init_logger() -> impl Drop {
    let filter = EnvFilter::new(env::var("TIDY_UP_LOG").unwrap_or_else(|_| "info".to_string()));

    let log_path = env::var("TIDY_UP_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share/tidy-up/logs/tidy-up.log"));
    let log_dir = log_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    if let Err(err) = fs::create_dir_all(&log_dir) {
        eprintln!("Could not create log directory {}: {}", log_dir.display(), err);
    }
    let file_name = log_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("tidy-up.log"));

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, file_name));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    debug!("Logging to {}", log_path.display());

    guard
}
