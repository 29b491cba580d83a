//! Logging utilities for the Agenda application.
//!
//! Sets up the tracing subscriber once at startup; every crate then logs
//! through the `tracing` macros.

use agenda_config::LoggingConfig;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber from the optional logging section of the config.
///
/// `RUST_LOG` wins over the configured level when it is set. When a log
/// directory is configured, a daily rolling file is written next to stdout;
/// the returned guard must be kept alive for the file writer to flush.
///
/// # Examples
///
/// ```
/// use agenda_common::logging;
///
/// let _guard = logging::init(None);
/// ```
pub fn init(config: Option<&LoggingConfig>) -> Option<WorkerGuard> {
    let level = config
        .and_then(|c| c.level.as_deref())
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let directory = config.and_then(|c| c.directory.as_deref());
    init_with_level(level, directory)
}

/// Initialize the tracing subscriber with a specific log level.
///
/// # Arguments
///
/// * `level` - The minimum log level to display.
/// * `directory` - Optional directory for a daily rolling log file.
pub fn init_with_level(level: Level, directory: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true);

    // try_init: a global subscriber may already be set (tests, embedding)
    let (result, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "agenda.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
            let result = tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer)
                .with(filter)
                .try_init();
            (result, Some(guard))
        }
        None => {
            let result = tracing_subscriber::registry()
                .with(stdout_layer)
                .with(filter)
                .try_init();
            (result, None)
        }
    };

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
    guard
}
