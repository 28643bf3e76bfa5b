//! Log output for a run.
//!
//! Every run writes a plain-text log file under the configured log directory
//! and mirrors warnings and errors to stderr. Verbosity follows `RUST_LOG`
//! and defaults to `info`.
//!
//! The subscriber is installed as the *scoped* default for the calling
//! thread and removed again when the returned [`LogGuard`] is dropped, so the
//! caller decides exactly how long it is active.

use chrono::Local;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self as tfmt, time::UtcTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::dates::{display_string, DateSeparator, Timestamp};

/// Keeps the run's subscriber installed while alive.
#[must_use = "logging stops when the guard is dropped"]
pub struct LogGuard {
    path: PathBuf,
    _default: DefaultGuard,
}

impl LogGuard {
    /// The log file this run writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `news_window_MM-DD-YYYY_HH-MM-SS.log`
pub fn log_file_name(now: &Timestamp) -> String {
    format!("news_window_{}.log", display_string(now, DateSeparator::Dash, true))
}

/// Create the log file in `log_dir` and install the run's subscriber.
///
/// # Errors
///
/// Fails when the directory or the file cannot be created.
pub fn init(log_dir: &Path) -> io::Result<LogGuard> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file_name(&Local::now()));
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tfmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());
    let stderr_layer = tfmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(LevelFilter::WARN);

    let subscriber = Registry::default()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer);
    let default = tracing::subscriber::set_default(subscriber);

    Ok(LogGuard {
        path,
        _default: default,
    })
}
