//! Logging setup
//!
//! One rolling log file, written off-thread. JSON mode writes structured
//! lines with targets to the file only; text mode also echoes to stdout.

use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// "hourly" | "daily" | "minutely", anything else never rotates
pub fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        "minutely" => Rotation::MINUTELY,
        _ => Rotation::NEVER,
    }
}

/// Filter directive for `config`: the `BWALLET` target (plan/skip/emit
/// detail) stays off unless tracing is enabled.
pub fn filter_directive(config: &AppConfig) -> String {
    if config.enable_tracing {
        config.log_level.clone()
    } else {
        format!("{},BWALLET=off", config.log_level)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured
/// filter. Keep the guard alive until exit or buffered output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let (json_file, text_file, stdout) = if config.use_json {
        let json = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(file_writer)
            .with_ansi(false);
        (Some(json), None, None)
    } else {
        let text = fmt::layer()
            .with_target(false)
            .with_writer(file_writer)
            .with_ansi(false);
        let stdout = fmt::layer().with_target(false).with_ansi(true);
        (None, Some(text), Some(stdout))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_file)
        .with(text_file)
        .with(stdout)
        .init();

    tracing::info!(
        dir = %config.log_dir,
        file = %config.log_file,
        rotation = %config.rotation,
        json = config.use_json,
        "Logging initialized"
    );
    guard
}
