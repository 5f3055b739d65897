//! Logging setup for the test server binary
//!
//! - Console output for development
//! - Optional JSON formatted logs to file, rotated daily or at 10MB

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global subscriber.
///
/// When `log_dir` is set, returns a guard that must be kept alive to ensure
/// file logs are flushed.
pub fn init_telemetry(log_dir: Option<&str>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("ostrichdb_testserver=debug,ostrichdb_core=debug,actix_web=info")
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let dir = Path::new(dir);
            std::fs::create_dir_all(dir)?;

            // testserver.log.YYYY-MM-DD, keeping up to 10 files per day
            let appender = RollingFileAppender::new(
                dir.join("testserver.log"),
                RollingConditionBasic::new()
                    .daily()
                    .max_size(10 * 1024 * 1024),
                9,
            )?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    match log_dir {
        Some(dir) => tracing::info!("Telemetry initialized with file logging to {}", dir),
        None => tracing::info!("Telemetry initialized (console only)"),
    }

    Ok(guard)
}
