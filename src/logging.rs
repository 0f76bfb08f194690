//! Tracing setup for hosts embedding the egovern core.
//!
//! The core only emits `tracing` events: rows dropped by the cleaner, filter
//! selectivity, degenerate statistics. A host that has no subscriber of its
//! own calls [`init`] (platform data directory) or [`init_with`] (any
//! directory) once at startup.
//!
//! ```no_run
//! let options = egovern::logging::LogOptions::in_dir("/var/log/egovern");
//! egovern::logging::init_with(&options).expect("Failed to initialize logging");
//! tracing::info!("Dashboard started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Prefix of the file receiving every event.
pub const ACTIVITY_LOG_PREFIX: &str = "egovern";
/// Prefix of the file receiving warnings and errors only.
pub const PROBLEM_LOG_PREFIX: &str = "problems";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogOptions {
    pub directory: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub default_directive: String,
    /// Also print events to stdout.
    pub console: bool,
    /// Daily files kept per log before the oldest is removed.
    pub max_files: usize,
}

impl LogOptions {
    pub fn in_dir(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            default_directive: "info".to_owned(),
            console: true,
            max_files: 10,
        }
    }
}

/// `<data dir>/egovern/logs`, e.g. `~/.local/share/egovern/logs` on Linux.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("egovern").join("logs"))
}

/// Logs to [`default_log_dir`].
///
/// # Errors
///
/// See [`init_with`]; also fails when the platform has no data directory.
pub fn init() -> Result<()> {
    let dir = default_log_dir().context("Failed to determine data directory")?;
    init_with(&LogOptions::in_dir(dir))
}

/// Logs to `dir` with default options.
///
/// # Errors
///
/// See [`init_with`].
pub fn init_in(dir: &Path) -> Result<()> {
    init_with(&LogOptions::in_dir(dir))
}

fn daily_appender(dir: &Path, prefix: &str, max_files: usize) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(max_files)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Installs the global subscriber: two daily-rolled files in
/// `options.directory` and optionally the console.
///
/// # Errors
///
/// Fails when the directory cannot be created, an appender cannot open its
/// file, or a global subscriber is already installed.
pub fn init_with(options: &LogOptions) -> Result<()> {
    let dir = &options.directory;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let activity = daily_appender(dir, ACTIVITY_LOG_PREFIX, options.max_files)?;
    let problems = daily_appender(dir, PROBLEM_LOG_PREFIX, options.max_files)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.default_directive))
        .context("Invalid log filter directive")?;

    let console_layer = options.console.then(|| fmt::layer().with_target(true).pretty());

    let activity_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(activity);

    let problem_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(problems)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(activity_layer)
        .with(problem_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!(log_dir = %dir.display(), "Logging initialized");
    Ok(())
}
