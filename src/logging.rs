//! Tracing initialization for applications embedding the crate.
//! Builds a subscriber with EnvFilter, supports compact or JSON formats, and optional file logging.
//!
//! Behavior:
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - JSON/non-JSON stdout formatting is selected via the `json` flag.
//! - If `log_file` is provided and passes safety checks, a non-blocking file layer is added.
//! - Initializing twice is an error rather than a panic.
//!
//! Implementation notes:
//! - File logging uses tracing_appender::non_blocking to avoid blocking on I/O.
//! - We refuse file logging if any ancestor of the file path is a symlink.

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::fmt as stdfmt;
use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogLevel, default_log_path, path_has_symlink_ancestor};
use crate::platform::open_log_file_append;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

#[inline]
fn env_filter_from_level(level_filter: LevelFilter) -> EnvFilter {
    EnvFilter::new(level_filter.to_string().to_ascii_lowercase())
}

/// Open a non-blocking file writer for logging, or explain why not.
fn open_non_blocking_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let has_link = path_has_symlink_ancestor(path)
        .with_context(|| format!("check log path '{}' for symlinks", path.display()))?;
    if has_link {
        return Err(anyhow!(
            "refusing file logging: an ancestor of '{}' is a symlink",
            path.display()
        ));
    }
    let file = open_log_file_append(path).with_context(|| format!("open log file '{}'", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Where a refused log file could go instead.
fn fallback_log_hint() -> String {
    match default_log_path() {
        Some(def) => format!("try the default log path {}", def.display()),
        None => "no default log path on this host".to_string(),
    }
}

/// Initialize tracing based on LogLevel and format. Returns an optional WorkerGuard
/// if a file appender is created (must be held until shutdown to flush logs).
///
/// A log file that cannot be used does not fail initialization: logging
/// continues on stdout and a warning names the reason.
pub fn init_tracing(lvl: &LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let env_filter = env_filter_from_level(to_level_filter(lvl));

    let (file_writer, guard, file_problem) = match log_file.map(open_non_blocking_writer) {
        Some(Ok((writer, guard))) => (Some(writer), Some(guard), None),
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    // Layers differ in type per format; Option<Layer> keeps a single registry chain.
    let init = if json {
        let stdout_layer = tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalHumanTime)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(true);
        let file_layer = file_writer.map(|writer| {
            tsfmt::layer()
                .event_format(tsfmt::format().json())
                .with_timer(LocalHumanTime)
                .with_level(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(writer)
        });
        registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
    } else {
        let stdout_layer = tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(true)
            .compact();
        let file_layer = file_writer.map(|writer| {
            tsfmt::layer()
                .with_timer(LocalHumanTime)
                .with_level(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .compact()
                .with_writer(writer)
        });
        registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
    };
    init.context("install tracing subscriber")?;

    if let Some(problem) = file_problem {
        warn!(
            error = %format!("{problem:#}"),
            hint = %fallback_log_hint(),
            "file logging not enabled; logs continue on stdout"
        );
    }
    Ok(guard)
}
