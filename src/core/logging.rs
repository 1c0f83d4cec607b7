use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::config::{AppPaths, LoggingConfig};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber: stdout always, plus a daily-rolling file
/// when `config.file` is set. `RUST_LOG` wins over `config.level`.
///
/// Only the first call in a process takes effect.
pub fn init(paths: &AppPaths, config: &LoggingConfig) {
    let file_layer = file_writer(paths, config).map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter(config))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

fn file_writer(paths: &AppPaths, config: &LoggingConfig) -> Option<NonBlocking> {
    if !config.file {
        return None;
    }
    if let Err(err) = std::fs::create_dir_all(&paths.log_dir) {
        eprintln!(
            "Log directory {} unavailable, logging to stdout only: {}",
            paths.log_dir.display(),
            err
        );
        return None;
    }

    let appender = tracing_appender::rolling::daily(&paths.log_dir, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    if LOG_GUARD.set(guard).is_err() {
        // Already initialised; the first writer stays in charge.
        return None;
    }
    Some(writer)
}
