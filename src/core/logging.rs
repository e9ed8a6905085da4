//! Logging initialization.
//!
//! Sets up the tracing stack used across the client:
//! - A stdout logger (pretty formatted, for host applications that want it).
//! - A file logger (JSON formatted, daily rolling) in the app data directory.
//! - A bridge so standard `log` crate events flow into `tracing`.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Resolved log directory (`<data dir>/datamere/logs`).
pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("datamere").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize the logging system.
///
/// This sets up:
/// 1. A stdout logger (pretty formatted with colors).
/// 2. A file logger (JSON formatted) in the app data directory.
/// 3. Redirects standard `log` crate events to `tracing`.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application to ensure buffered logs are flushed on shutdown.
pub fn init() -> WorkerGuard {
    let log_dir = log_dir();

    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    // Daily rolling file appender, non-blocking writer
    let file_appender = tracing_appender::rolling::daily(&log_dir, "datamere-client.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // File layer: JSON format for easy parsing/ingestion
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    // Stdout layer: pretty human-readable format
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .pretty()
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    // Redirect standard `log` macros to `tracing`
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join("datamere-client.log")
    );

    guard
}

/// Initialize the logging system without the stdout layer.
///
/// Identical to [`init()`] but file-only, for host applications that own
/// the terminal (TUIs, progress-bar heavy CLIs).
pub fn init_quiet() -> WorkerGuard {
    let log_dir = log_dir();

    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "datamere-client.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(file_layer).init();

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    guard
}
